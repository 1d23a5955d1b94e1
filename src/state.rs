/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - handler が使う collaborator のみ (revocation store)
 * - Clone 前提で持つ (内部は Arc)
 * - 認証済み identity はここに置かない (リクエストごとの RequestContextStore が持つ)
 */
use std::{sync::Arc, time::Duration};

use crate::error::AppError;
use crate::services::auth::revocation::RevocationStore;

#[derive(Clone)]
pub struct AppState {
    pub revocations: Arc<dyn RevocationStore>,
    pub revocation_timeout: Duration,
    // TokenCodec accepts tokens this long after `exp`
    pub token_leeway: Duration,
}

impl AppState {
    pub fn new(
        revocations: Arc<dyn RevocationStore>,
        revocation_timeout: Duration,
        token_leeway: Duration,
    ) -> Self {
        Self {
            revocations,
            revocation_timeout,
            token_leeway,
        }
    }

    /// How long a revocation of a token expiring at `expires_at` must live:
    /// until the token no longer verifies, leeway included.
    pub fn revocation_ttl(&self, expires_at: i64, now: i64) -> Duration {
        let remaining = u64::try_from(expires_at.saturating_sub(now)).unwrap_or(0);
        Duration::from_secs(remaining.max(1)) + self.token_leeway
    }

    /// Explicit revocation (logout / admin). Failures and timeouts surface as 5xx.
    pub async fn revoke(&self, token_id: &str, ttl: Duration) -> Result<(), AppError> {
        let revoke = self.revocations.revoke(token_id, ttl);
        match tokio::time::timeout(self.revocation_timeout, revoke).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::error!(
                    backend = self.revocations.backend_name(),
                    "revocation write timed out"
                );
                Err(AppError::Internal)
            }
        }
    }
}
