use std::{sync::Arc, time::Duration};

use crate::services::{
    auth::revocation::store::{RevocationError, RevocationFuture, RevocationStore},
    cache::{CacheClient, ValkeyClient},
};

/// Valkey-backed revocation store (Redis protocol).
///
/// `SET <prefix>:<token_id> 1 EX <ttl>` on revoke, `EXISTS` on lookup.
#[derive(Clone)]
pub struct ValkeyRevocationStore<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix to avoid collisions across environments
    prefix: String,
}

impl ValkeyRevocationStore<ValkeyClient> {
    pub async fn connect(
        valkey_url: &str,
        prefix: impl Into<String>,
    ) -> Result<Self, RevocationError> {
        let client = ValkeyClient::new(valkey_url).await?;

        Ok(Self::new_with_cache(Arc::new(client), prefix))
    }
}

impl<C: CacheClient> ValkeyRevocationStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, token_id: &str) -> String {
        format!("{}:{}", self.prefix, token_id)
    }
}

impl<C: CacheClient> RevocationStore for ValkeyRevocationStore<C> {
    fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    fn exists<'a>(&'a self, token_id: &'a str) -> RevocationFuture<'a, bool> {
        Box::pin(async move { Ok(self.cache.exists(&self.key(token_id)).await?) })
    }

    fn revoke<'a>(&'a self, token_id: &'a str, ttl: Duration) -> RevocationFuture<'a, ()> {
        Box::pin(async move {
            if ttl.is_zero() {
                return Err(RevocationError::InvalidTtl);
            }
            self.cache
                .set_with_ttl(&self.key(token_id), "1", ttl)
                .await?;
            Ok(())
        })
    }
}
