use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::middleware::pipeline::{RequestContextStore, UserContext};

/// Handler で UserContext を受け取るための extractor
///
/// pipeline が RequestContextStore を request extensions に insert 済みである前提。
/// identity が bind されていない (または pipeline が掛かっていない) 場合は 401。
pub struct CurrentUser(pub UserContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContextStore>()
            .and_then(RequestContextStore::current)
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
