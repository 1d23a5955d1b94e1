//! Authentication gate: routes that need *any* identity get 401 without one.
use std::sync::Arc;

use async_trait::async_trait;

use crate::middleware::pipeline::stage::{Rejection, Stage, StageInput, StageOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Unauthorized,
}

pub trait AuthenticationGate: Send + Sync {
    fn require_identity(&self, route_requires: bool, has_context: bool) -> GateDecision;
}

/// Default gate: identity is required exactly when the route says so.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireIdentityGate;

impl AuthenticationGate for RequireIdentityGate {
    fn require_identity(&self, route_requires: bool, has_context: bool) -> GateDecision {
        if route_requires && !has_context {
            GateDecision::Unauthorized
        } else {
            GateDecision::Allow
        }
    }
}

pub struct AuthenticationGateStage {
    gate: Arc<dyn AuthenticationGate>,
}

impl AuthenticationGateStage {
    pub fn new(gate: Arc<dyn AuthenticationGate>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl Stage for AuthenticationGateStage {
    fn name(&self) -> &'static str {
        "authentication_gate"
    }

    async fn run(&self, input: &StageInput<'_>) -> StageOutcome {
        let route_requires = input.route.rule().requires_identity();
        match self
            .gate
            .require_identity(route_requires, input.context.has_identity())
        {
            GateDecision::Allow => StageOutcome::Continue,
            GateDecision::Unauthorized => StageOutcome::Reject(Rejection::MissingIdentity),
        }
    }
}
