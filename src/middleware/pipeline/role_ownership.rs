//! Role and ownership authorization. Fails closed.
//!
//! 1. minRole `User` → allow, no identity needed
//! 2. no identity → 401
//! 3. role below minRole → 403
//! 4. admin → allow (ownership is never checked for admins)
//! 5. ownership-scoped route + merchant → ask the oracle for the addressed resource;
//!    false, error or timeout → 403
use std::{str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::middleware::pipeline::{
    context::UserContext,
    stage::{Rejection, Stage, StageInput, StageOutcome},
};
use crate::services::auth::Role;
use crate::services::ownership::OwnershipRegistry;
use crate::services::routing::{OwnershipScope, ResourceIdError};

/// What to do when an ownership-scoped route's resource id cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnparseablePolicy {
    #[default]
    Reject,
    Skip,
}

impl FromStr for UnparseablePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "skip" => Ok(Self::Skip),
            _ => Err(()),
        }
    }
}

pub struct RoleOwnershipStage {
    registry: Arc<OwnershipRegistry>,
    lookup_timeout: Duration,
    unparseable: UnparseablePolicy,
}

impl RoleOwnershipStage {
    pub fn new(
        registry: Arc<OwnershipRegistry>,
        lookup_timeout: Duration,
        unparseable: UnparseablePolicy,
    ) -> Self {
        Self {
            registry,
            lookup_timeout,
            unparseable,
        }
    }

    fn unparseable(&self, err: ResourceIdError) -> StageOutcome {
        match self.unparseable {
            UnparseablePolicy::Reject => StageOutcome::Reject(Rejection::OwnershipUnverifiable {
                reason: err.reason(),
            }),
            UnparseablePolicy::Skip => {
                tracing::warn!(error = %err, "ownership check skipped: resource id not parseable");
                StageOutcome::Continue
            }
        }
    }

    async fn verify(
        &self,
        user: &UserContext,
        scope: &OwnershipScope,
        resource_id: i64,
    ) -> StageOutcome {
        let oracle = match self.registry.resolve(&scope.resource) {
            Ok(oracle) => oracle,
            Err(err) => {
                tracing::error!(error = %err, "ownership oracle missing");
                return StageOutcome::Reject(Rejection::OwnershipUnverifiable {
                    reason: err.reason(),
                });
            }
        };

        let check = oracle.check_ownership(user.user_id, resource_id);
        match tokio::time::timeout(self.lookup_timeout, check).await {
            Ok(Ok(true)) => StageOutcome::Continue,
            Ok(Ok(false)) => StageOutcome::Reject(Rejection::OwnershipDenied { resource_id }),
            Ok(Err(err)) => {
                tracing::warn!(
                    error = %err,
                    resource = %scope.resource,
                    resource_id,
                    "ownership lookup failed"
                );
                StageOutcome::Reject(Rejection::OwnershipUnverifiable {
                    reason: "oracle_error",
                })
            }
            Err(_) => {
                tracing::warn!(
                    resource = %scope.resource,
                    resource_id,
                    timeout = ?self.lookup_timeout,
                    "ownership lookup timed out"
                );
                StageOutcome::Reject(Rejection::OwnershipUnverifiable {
                    reason: "oracle_timeout",
                })
            }
        }
    }
}

#[async_trait]
impl Stage for RoleOwnershipStage {
    fn name(&self) -> &'static str {
        "role_ownership"
    }

    async fn run(&self, input: &StageInput<'_>) -> StageOutcome {
        let rule = input.route.rule();
        let required = rule.min_role();
        if required == Role::User {
            return StageOutcome::Continue;
        }

        let Some(user) = input.context.current() else {
            return StageOutcome::Reject(Rejection::MissingIdentity);
        };

        if !user.role.satisfies(required) {
            return StageOutcome::Reject(Rejection::RoleInsufficient {
                required,
                actual: user.role,
            });
        }

        if user.role.is_admin() {
            return StageOutcome::Continue;
        }

        match rule.ownership() {
            Some(scope) if required == Role::Merchant && user.role == Role::Merchant => {
                match input.route.resource_id() {
                    Ok(resource_id) => self.verify(&user, scope, resource_id).await,
                    Err(err) => self.unparseable(err),
                }
            }
            _ => StageOutcome::Continue,
        }
    }
}
