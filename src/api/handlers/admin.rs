/*
 * Responsibility
 * - POST /admin/sessions/revoke: 管理者による token の強制失効
 * - admin 権限の確認は pipeline (route table の /admin 配下) の責務
 */
use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::{dto::session::RevokeSessionRequest, extractors::CurrentUser},
    error::AppError,
    state::AppState,
};

pub async fn revoke_session(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Json(req): Json<RevokeSessionRequest>,
) -> Result<StatusCode, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_REQUEST", msg))?;

    state
        .revoke(req.token_id.trim(), Duration::from_secs(req.ttl_seconds))
        .await?;

    tracing::info!(
        admin_id = admin.user_id,
        ttl_seconds = req.ttl_seconds,
        "session revoked by admin"
    );
    Ok(StatusCode::NO_CONTENT)
}
