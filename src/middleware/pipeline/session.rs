//! Session continuity: credential → (revocation check) → verify → bind.
//!
//! This stage never rejects. Every failure mode (no header, revoked, invalid,
//! revocation backend down or slow) leaves the request without identity and
//! lets later stages decide.
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, header};

use crate::middleware::pipeline::stage::{Stage, StageInput, StageOutcome};
use crate::services::auth::{
    TokenCodec,
    revocation::{RevocationStore, revocation_key},
};

/// Which header carries the credential. An optional `Bearer ` prefix is stripped.
#[derive(Debug, Clone)]
pub struct CredentialHeader {
    name: HeaderName,
}

impl Default for CredentialHeader {
    fn default() -> Self {
        Self::new(header::AUTHORIZATION)
    }
}

impl CredentialHeader {
    pub fn new(name: HeaderName) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    pub fn extract<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        let value = headers.get(&self.name)?.to_str().ok()?.trim();
        let value = match value.split_once(' ') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            // scheme without credential
            None if value.eq_ignore_ascii_case("bearer") => return None,
            _ => value,
        };
        (!value.is_empty()).then_some(value)
    }
}

enum RevocationCheck {
    Clear,
    Revoked,
    Unavailable,
}

pub struct SessionContinuityStage {
    codec: Arc<TokenCodec>,
    revocations: Arc<dyn RevocationStore>,
    credential: CredentialHeader,
    lookup_timeout: Duration,
}

impl SessionContinuityStage {
    pub fn new(
        codec: Arc<TokenCodec>,
        revocations: Arc<dyn RevocationStore>,
        credential: CredentialHeader,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            codec,
            revocations,
            credential,
            lookup_timeout,
        }
    }

    async fn check_revocation(&self, key: &str) -> RevocationCheck {
        match tokio::time::timeout(self.lookup_timeout, self.revocations.exists(key)).await {
            Ok(Ok(false)) => RevocationCheck::Clear,
            Ok(Ok(true)) => RevocationCheck::Revoked,
            Ok(Err(err)) => {
                tracing::warn!(
                    error = %err,
                    backend = self.revocations.backend_name(),
                    "revocation lookup failed; continuing without identity"
                );
                RevocationCheck::Unavailable
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.lookup_timeout,
                    backend = self.revocations.backend_name(),
                    "revocation lookup timed out; continuing without identity"
                );
                RevocationCheck::Unavailable
            }
        }
    }
}

#[async_trait]
impl Stage for SessionContinuityStage {
    fn name(&self) -> &'static str {
        "session_continuity"
    }

    async fn run(&self, input: &StageInput<'_>) -> StageOutcome {
        let Some(raw) = self.credential.extract(input.headers) else {
            return StageOutcome::Continue;
        };

        match self.check_revocation(&revocation_key(raw)).await {
            RevocationCheck::Clear => {}
            RevocationCheck::Revoked => {
                tracing::info!(path = input.path, "revoked session token presented");
                return StageOutcome::Continue;
            }
            RevocationCheck::Unavailable => return StageOutcome::Continue,
        }

        let token = match self.codec.decode(raw) {
            Ok(token) => token,
            Err(err) => {
                tracing::debug!(error = %err, "session token rejected");
                return StageOutcome::Continue;
            }
        };

        tracing::debug!(user_id = token.user_id, role = %token.role, "session bound");
        if let Err(err) = input.context.bind(token.into()) {
            tracing::warn!(error = %err, "session already bound");
        }

        StageOutcome::Continue
    }
}
