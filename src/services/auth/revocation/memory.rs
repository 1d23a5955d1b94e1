use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
    time::{Duration, Instant},
};

use crate::services::auth::revocation::store::{
    RevocationError, RevocationFuture, RevocationStore,
};

/// Process-local revocation store for development and tests.
///
/// Reads take a shared lock; expired entries are purged on every write.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<String, Instant>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn exists<'a>(&'a self, token_id: &'a str) -> RevocationFuture<'a, bool> {
        Box::pin(async move {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            Ok(entries
                .get(token_id)
                .is_some_and(|expires_at| *expires_at > Instant::now()))
        })
    }

    fn revoke<'a>(&'a self, token_id: &'a str, ttl: Duration) -> RevocationFuture<'a, ()> {
        Box::pin(async move {
            if ttl.is_zero() {
                return Err(RevocationError::InvalidTtl);
            }
            let now = Instant::now();
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            entries.retain(|_, expires_at| *expires_at > now);
            entries.insert(token_id.to_string(), now + ttl);
            Ok(())
        })
    }
}
