use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;
use crate::pipeline::SyncPipeline;
use crate::server::handlers;

/// Paths served by the router itself; the metrics route must not collide.
pub const BUILTIN_ROUTES: [&str; 5] = [
    "/health",
    "/check/marketplace",
    "/check/destination",
    "/sync",
    "/amazon/sync",
];

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub pipeline: Arc<SyncPipeline>,
}

impl AppState {
    pub async fn new(pipeline: SyncPipeline) -> Self {
        let metrics = get_metrics().await;
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Health, probes, sync trigger and (when enabled) metrics.
pub fn router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/check/marketplace", get(handlers::check_marketplace))
        .route("/check/destination", get(handlers::check_destination))
        .route("/sync", post(handlers::sync))
        .route("/amazon/sync", post(handlers::sync))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn start(
    settings_config: &SettingsConfig,
    pipeline: SyncPipeline,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(pipeline).await;
    let app = router(settings_config, state);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow!("cannot bind {}: {}", bind_addr, e))?;
    info!(address = %bind_addr, "http server listening");

    metrics.up.set(1);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;
    metrics.up.set(0);
    served.map_err(|e| anyhow!("http server failed: {}", e))
}
