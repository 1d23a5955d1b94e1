use std::{future::Future, pin::Pin, time::Duration};

use crate::services::cache::CacheError;

pub type RevocationFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RevocationError>> + Send + 'a>>;

/// Registry of invalidated session token ids.
///
/// - Existence of a key is the whole signal; there is no payload.
/// - Entries expire on their own after `ttl` (no unbounded growth).
/// - Treated as remote: callers must bound every call with a timeout.
pub trait RevocationStore: Send + Sync {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Returns:
    // - Ok(true)  => token id is revoked
    // - Ok(false) => not revoked (or the entry already expired)
    // - Err(_)    => backend failure; the caller picks fail-open or fail-closed
    fn exists<'a>(&'a self, token_id: &'a str) -> RevocationFuture<'a, bool>;

    fn revoke<'a>(&'a self, token_id: &'a str, ttl: Duration) -> RevocationFuture<'a, ()>;
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("revocation ttl must be greater than zero")]
    InvalidTtl,
}
