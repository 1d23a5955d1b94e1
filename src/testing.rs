//! Shared fixtures for unit and router tests.
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, header};

use crate::middleware::pipeline::{
    AuthenticationGateStage, CredentialHeader, Pipeline, RequireIdentityGate, RoleOwnershipStage,
    SessionContinuityStage, UnparseablePolicy,
};
use crate::repos::error::RepoError;
use crate::services::auth::{
    Role, TokenCodec, TokenKeys,
    revocation::{
        InMemoryRevocationStore, RevocationError, RevocationStore, store::RevocationFuture,
    },
};
use crate::services::cache::CacheError;
use crate::services::ownership::{OwnershipError, OwnershipOracle, OwnershipRegistry};
use crate::services::routing::RouteTable;

pub const SECRET: &[u8] = b"pipeline-test-secret";

pub fn codec_with_secret(secret: &[u8]) -> TokenCodec {
    codec_with_leeway(secret, 0)
}

pub fn codec_with_leeway(secret: &[u8], leeway_seconds: u64) -> TokenCodec {
    let keys = TokenKeys::Hmac {
        secret: secret.to_vec(),
    };
    TokenCodec::new(&keys, "shop-gate-test", "shop-api-test", leeway_seconds).unwrap()
}

pub fn codec() -> Arc<TokenCodec> {
    Arc::new(codec_with_secret(SECRET))
}

pub fn token(user_id: i64, role: Role) -> String {
    token_with_ttl(user_id, role, 600)
}

pub fn token_with_ttl(user_id: i64, role: Role, ttl_seconds: i64) -> String {
    let codec = codec();
    codec
        .encode(&codec.claims_for(user_id, role, ttl_seconds))
        .unwrap()
}

pub fn bearer(raw: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {raw}")).unwrap(),
    );
    headers
}

/// Ownership oracle with a fixed answer set.
#[derive(Default)]
pub struct ScriptedOwnership {
    owned: HashSet<(i64, i64)>,
    delay: Option<Duration>,
    failing: bool,
    calls: AtomicUsize,
}

impl ScriptedOwnership {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn owns(user_id: i64, resource_id: i64) -> Self {
        Self {
            owned: HashSet::from([(user_id, resource_id)]),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OwnershipOracle for ScriptedOwnership {
    async fn check_ownership(
        &self,
        user_id: i64,
        resource_id: i64,
    ) -> Result<bool, OwnershipError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut).into());
        }
        Ok(self.owned.contains(&(user_id, resource_id)))
    }
}

/// Revocation backend that never answers.
pub struct StallingRevocations;

impl RevocationStore for StallingRevocations {
    fn backend_name(&self) -> &'static str {
        "stalling"
    }

    fn exists<'a>(&'a self, _token_id: &'a str) -> RevocationFuture<'a, bool> {
        Box::pin(std::future::pending())
    }

    fn revoke<'a>(&'a self, _token_id: &'a str, _ttl: Duration) -> RevocationFuture<'a, ()> {
        Box::pin(std::future::pending())
    }
}

/// Revocation backend that is down.
pub struct FailingRevocations;

impl RevocationStore for FailingRevocations {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    fn exists<'a>(&'a self, _token_id: &'a str) -> RevocationFuture<'a, bool> {
        Box::pin(async {
            Err(RevocationError::Cache(CacheError::BackendConnection(
                "connection refused".into(),
            )))
        })
    }

    fn revoke<'a>(&'a self, _token_id: &'a str, _ttl: Duration) -> RevocationFuture<'a, ()> {
        Box::pin(async {
            Err(RevocationError::Cache(CacheError::BackendConnection(
                "connection refused".into(),
            )))
        })
    }
}

pub const LOOKUP_TIMEOUT: Duration = Duration::from_millis(100);

/// Collaborators behind one test pipeline.
pub struct Collaborators {
    pub revocations: Arc<dyn RevocationStore>,
    pub ownership: Arc<ScriptedOwnership>,
    pub policy: UnparseablePolicy,
    pub leeway_seconds: u64,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            revocations: Arc::new(InMemoryRevocationStore::new()),
            ownership: Arc::new(ScriptedOwnership::none()),
            policy: UnparseablePolicy::Reject,
            leeway_seconds: 0,
        }
    }
}

pub fn session_stage(c: &Collaborators) -> SessionContinuityStage {
    SessionContinuityStage::new(
        Arc::new(codec_with_leeway(SECRET, c.leeway_seconds)),
        c.revocations.clone(),
        CredentialHeader::default(),
        LOOKUP_TIMEOUT,
    )
}

pub fn role_stage(c: &Collaborators) -> RoleOwnershipStage {
    let registry = OwnershipRegistry::new().register("shop", c.ownership.clone());
    RoleOwnershipStage::new(Arc::new(registry), LOOKUP_TIMEOUT, c.policy)
}

pub fn pipeline(c: Collaborators) -> Pipeline {
    Pipeline::new(
        Arc::new(RouteTable::builtin().unwrap()),
        session_stage(&c),
        AuthenticationGateStage::new(Arc::new(RequireIdentityGate)),
        role_stage(&c),
    )
}
