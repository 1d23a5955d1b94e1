use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::middleware::pipeline::{RequestContextStore, UserContext};

/// guest でも通る route 向け。identity が無ければ None (reject しない)
pub struct MaybeUser(pub Option<UserContext>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<RequestContextStore>()
                .and_then(RequestContextStore::current),
        ))
    }
}
