/*
 * Responsibility
 * - GET /user/me: bind 済み identity を返す
 * - POST /user/logout: 現在の token を検証が通らなくなるまで (残り有効期間 + leeway) 失効させる
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::{dto::session::MeResponse, extractors::CurrentUser},
    error::AppError,
    state::AppState,
};

pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id,
        role: user.role,
    })
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, AppError> {
    let ttl = state.revocation_ttl(user.expires_at, chrono::Utc::now().timestamp());

    state.revoke(&user.token_id, ttl).await?;

    tracing::info!(user_id = user.user_id, "session revoked by logout");
    Ok(StatusCode::NO_CONTENT)
}
