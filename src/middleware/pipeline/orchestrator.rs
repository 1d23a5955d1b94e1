//! Request pipeline: session continuity → authentication gate → role/ownership → handler.
//!
//! The order is fixed at construction. A fresh `RequestContextStore` is created
//! per request and cleared by a drop guard once the response (or a rejection,
//! panic or cancellation) ends the request.
use std::{future::Future, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::middleware::pipeline::{
    context::RequestContextStore,
    gate::AuthenticationGateStage,
    role_ownership::RoleOwnershipStage,
    session::SessionContinuityStage,
    stage::{Stage, StageInput, StageOutcome},
};
use crate::services::routing::RouteTable;

pub struct Pipeline {
    routes: Arc<RouteTable>,
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new(
        routes: Arc<RouteTable>,
        session: SessionContinuityStage,
        gate: AuthenticationGateStage,
        role_ownership: RoleOwnershipStage,
    ) -> Self {
        Self::from_stages(
            routes,
            vec![Arc::new(session), Arc::new(gate), Arc::new(role_ownership)],
        )
    }

    pub(crate) fn from_stages(routes: Arc<RouteTable>, stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { routes, stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn handle<H, Fut>(&self, mut req: Request<Body>, handler: H) -> Response
    where
        H: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        let context = RequestContextStore::new();
        // declared first, dropped last
        let _clear = context.clear_on_drop();
        req.extensions_mut().insert(context.clone());

        let path = req.uri().path().to_owned();
        let route = self.routes.resolve(&path);

        for stage in &self.stages {
            let input = StageInput {
                headers: req.headers(),
                path: &path,
                route: &route,
                context: &context,
            };
            if let StageOutcome::Reject(rejection) = stage.run(&input).await {
                tracing::info!(
                    stage = stage.name(),
                    reason = rejection.reason(),
                    path = %path,
                    route = route.rule().pattern().as_str(),
                    "request rejected"
                );
                return AppError::from(rejection).into_response();
            }
        }

        handler(req).await
    }
}

/// Run the pipeline in front of every route of `router` (fallback included).
pub fn apply(router: Router, pipeline: Arc<Pipeline>) -> Router {
    router.layer(middleware::from_fn_with_state(pipeline, pipeline_middleware))
}

async fn pipeline_middleware(
    State(pipeline): State<Arc<Pipeline>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    pipeline.handle(req, move |req| next.run(req)).await
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use super::*;
    use crate::middleware::pipeline::stage::Rejection;
    use crate::services::auth::Role;
    use crate::testing;

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        outcome: StageOutcome,
    }

    #[async_trait]
    impl Stage for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(&self, _input: &StageInput<'_>) -> StageOutcome {
            self.log.lock().unwrap().push(self.name);
            self.outcome.clone()
        }
    }

    fn recording(
        log: &Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
        outcome: StageOutcome,
    ) -> Arc<dyn Stage> {
        Arc::new(Recording {
            name,
            log: log.clone(),
            outcome,
        })
    }

    fn request(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    /// Handler that hands out the request's store so the test can inspect it afterwards.
    fn stash(slot: &Arc<Mutex<Option<RequestContextStore>>>, req: &Request<Body>) {
        *slot.lock().unwrap() = req.extensions().get::<RequestContextStore>().cloned();
    }

    #[test]
    fn stages_are_assembled_in_fixed_order() {
        let pipeline = testing::pipeline(testing::Collaborators::default());
        assert_eq!(
            pipeline.stage_names(),
            vec!["session_continuity", "authentication_gate", "role_ownership"]
        );
    }

    #[tokio::test]
    async fn rejection_short_circuits_remaining_stages_and_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::from_stages(
            Arc::new(RouteTable::builtin().unwrap()),
            vec![
                recording(&log, "first", StageOutcome::Continue),
                recording(
                    &log,
                    "second",
                    StageOutcome::Reject(Rejection::RoleInsufficient {
                        required: Role::Admin,
                        actual: Role::User,
                    }),
                ),
                recording(&log, "third", StageOutcome::Continue),
            ],
        );
        let handled = AtomicUsize::new(0);

        let response = pipeline
            .handle(request("/admin/x"), |_req| async {
                handled.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK.into_response()
            })
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(handled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn context_is_cleared_after_success_and_rejection() {
        let collaborators = testing::Collaborators::default();
        let pipeline = testing::pipeline(collaborators);
        let slot = Arc::new(Mutex::new(None));

        let mut req = request("/user/me");
        req.headers_mut()
            .extend(testing::bearer(&testing::token(3, Role::User)));
        let response = pipeline
            .handle(req, |req| {
                stash(&slot, &req);
                let bound = req
                    .extensions()
                    .get::<RequestContextStore>()
                    .is_some_and(|s| s.has_identity());
                async move {
                    assert!(bound);
                    StatusCode::OK.into_response()
                }
            })
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let store = slot.lock().unwrap().take().unwrap();
        assert!(!store.has_identity());

        // rejected: merchant on an admin route; identity was bound by the session stage
        let log = Arc::new(Mutex::new(None));
        let observer: Arc<dyn Stage> = Arc::new(StashStage(log.clone()));
        let pipeline = Pipeline::from_stages(
            Arc::new(RouteTable::builtin().unwrap()),
            vec![
                Arc::new(testing::session_stage(&testing::Collaborators::default())),
                observer,
                Arc::new(testing::role_stage(&testing::Collaborators::default())),
            ],
        );
        let mut req = request("/admin/users");
        req.headers_mut()
            .extend(testing::bearer(&testing::token(4, Role::Merchant)));
        let response = pipeline
            .handle(req, |_req| async { StatusCode::OK.into_response() })
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let store = log.lock().unwrap().take().unwrap();
        assert!(!store.has_identity());
    }

    struct StashStage(Arc<Mutex<Option<RequestContextStore>>>);

    #[async_trait]
    impl Stage for StashStage {
        fn name(&self) -> &'static str {
            "stash"
        }

        async fn run(&self, input: &StageInput<'_>) -> StageOutcome {
            assert!(input.context.has_identity());
            *self.0.lock().unwrap() = Some(input.context.clone());
            StageOutcome::Continue
        }
    }

    async fn explode(_req: Request<Body>) -> Response {
        panic!("handler blew up")
    }

    #[tokio::test]
    async fn context_is_cleared_when_the_handler_panics() {
        let pipeline = Arc::new(testing::pipeline(testing::Collaborators::default()));
        let slot = Arc::new(Mutex::new(None));

        let task = {
            let pipeline = pipeline.clone();
            let slot = slot.clone();
            tokio::spawn(async move {
                let mut req = request("/merchant/orders");
                req.headers_mut()
                    .extend(testing::bearer(&testing::token(8, Role::Merchant)));
                pipeline
                    .handle(req, |req| {
                        stash(&slot, &req);
                        explode(req)
                    })
                    .await
            })
        };

        let err = task.await.unwrap_err();
        assert!(err.is_panic());
        let store = slot.lock().unwrap().take().unwrap();
        assert!(!store.has_identity());
    }

    #[tokio::test]
    async fn context_is_cleared_when_the_request_is_cancelled() {
        let pipeline = testing::pipeline(testing::Collaborators::default());
        let slot = Arc::new(Mutex::new(None));

        let mut req = request("/merchant/orders");
        req.headers_mut()
            .extend(testing::bearer(&testing::token(8, Role::Merchant)));
        let handling = pipeline.handle(req, |req| {
            stash(&slot, &req);
            std::future::pending::<Response>()
        });

        // client went away
        assert!(
            tokio::time::timeout(Duration::from_millis(50), handling)
                .await
                .is_err()
        );

        let store = slot.lock().unwrap().take().unwrap();
        assert!(!store.has_identity());
    }
}
