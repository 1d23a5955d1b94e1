//! Cache client interface used by higher-level services (session revocation).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Kept independent from `AppError` so callers decide the failure policy
/// (fail-open for session lookup, surfaced as 500 for explicit revocation).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// A minimal cache interface.
///
/// Revocation only needs `EXISTS` and `SET ... EX`; keep the surface small.
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    // Set (or overwrite) a value with TTL. The backend expires it on its own.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;
}
