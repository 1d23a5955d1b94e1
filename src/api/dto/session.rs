/*
 * Responsibility
 * - session 系 (me / logout / 強制失効) の request/response DTO
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::Role;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSessionRequest {
    pub token_id: String,
    pub ttl_seconds: u64,
}

impl RevokeSessionRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.token_id.trim().is_empty() {
            return Err("tokenId is required");
        }
        if self.ttl_seconds == 0 {
            return Err("ttlSeconds must be greater than zero");
        }
        Ok(())
    }
}
