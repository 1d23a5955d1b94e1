use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::error::AppError;
use crate::middleware::pipeline::context::RequestContextStore;
use crate::services::auth::Role;
use crate::services::routing::RouteMatch;

/// What a stage sees of the request. The body is never exposed.
pub struct StageInput<'a> {
    pub headers: &'a HeaderMap,
    pub path: &'a str,
    pub route: &'a RouteMatch<'a>,
    pub context: &'a RequestContextStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingIdentity,
    RoleInsufficient { required: Role, actual: Role },
    OwnershipDenied { resource_id: i64 },
    OwnershipUnverifiable { reason: &'static str },
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MissingIdentity => "missing_identity",
            Rejection::RoleInsufficient { .. } => "role_insufficient",
            Rejection::OwnershipDenied { .. } => "ownership_denied",
            Rejection::OwnershipUnverifiable { .. } => "ownership_unverifiable",
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MissingIdentity => AppError::Unauthorized,
            _ => AppError::Forbidden,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Continue,
    Reject(Rejection),
}

/// One step of the request pipeline.
///
/// Stages run sequentially on the request's own task; a `Reject` skips the
/// remaining stages and the handler.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, input: &StageInput<'_>) -> StageOutcome;
}
