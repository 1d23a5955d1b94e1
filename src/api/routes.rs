/*
 * Responsibility
 * - この service 自身が持つ URL (health / session / admin)
 * - それ以外の business route は外部 service の責務
 * - 認証・認可は route ごとではなく pipeline (middleware) がまとめて掛ける
 * - 未知の path は pipeline を通過した後に 404
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    admin::revoke_session,
    health::health,
    session::{logout, me},
};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/user/me", get(me))
        .route("/user/logout", post(logout))
        .route("/admin/sessions/revoke", post(revoke_session))
        .fallback(route_not_found)
}

async fn route_not_found() -> AppError {
    AppError::not_found("route")
}
