/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (codec, revocation, ownership registry, route table)
 * - pipeline の組み立て → Router 組み立て → axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware::{
        self,
        pipeline::{
            AuthenticationGateStage, CredentialHeader, Pipeline, RequireIdentityGate,
            RoleOwnershipStage, SessionContinuityStage,
        },
    },
    services::{
        auth::{
            TokenCodec,
            revocation::{InMemoryRevocationStore, RevocationStore, ValkeyRevocationStore},
        },
        ownership::{OwnershipRegistry, PgShopOwnership},
        routing::RouteTable,
    },
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,shop_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // In development, fail fast. In production the request's task unwinds,
        // its identity is cleared by the pipeline guard, and the server keeps running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let revocations = build_revocation_store(&config).await?;
    let pipeline = Arc::new(build_pipeline(&config, revocations.clone()).await?);
    let state = AppState::new(
        revocations,
        config.revocation_lookup_timeout,
        Duration::from_secs(config.access_token_leeway_seconds),
    );

    let app = build_router(state, pipeline);
    let app = middleware::cors::apply(app, &config);
    let app = middleware::http::apply(app, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_revocation_store(config: &Config) -> Result<Arc<dyn RevocationStore>> {
    match &config.valkey_url {
        Some(url) => {
            let store = ValkeyRevocationStore::connect(url, config.revocation_key_prefix.clone())
                .await
                .context("failed to connect revocation store")?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("VALKEY_URL not set; using process-local revocation store");
            Ok(Arc::new(InMemoryRevocationStore::new()))
        }
    }
}

async fn build_pipeline(
    config: &Config,
    revocations: Arc<dyn RevocationStore>,
) -> Result<Pipeline> {
    let routes = match &config.route_rules_path {
        Some(path) => RouteTable::load(path)
            .with_context(|| format!("failed to load route rules from {path}"))?,
        None => RouteTable::builtin()?,
    };
    let routes = Arc::new(routes);

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect database")?;

    let registry = OwnershipRegistry::new().register("shop", Arc::new(PgShopOwnership::new(db)));
    registry.ensure_covers(routes.ownership_resources())?;

    let codec = TokenCodec::new(
        &config.token_keys,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    )?;

    Ok(Pipeline::new(
        routes,
        SessionContinuityStage::new(
            Arc::new(codec),
            revocations,
            CredentialHeader::new(config.session_header.clone()),
            config.revocation_lookup_timeout,
        ),
        AuthenticationGateStage::new(Arc::new(RequireIdentityGate)),
        RoleOwnershipStage::new(
            Arc::new(registry),
            config.ownership_lookup_timeout,
            config.ownership_unparseable_policy,
        ),
    ))
}

pub fn build_router(state: AppState, pipeline: Arc<Pipeline>) -> Router {
    let router = api::routes().with_state(state);
    middleware::pipeline::orchestrator::apply(router, pipeline)
}
