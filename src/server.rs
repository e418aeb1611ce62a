pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use prometheus_client::registry::Registry;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ServeArgs;
use crate::health;
use crate::k8s::client::build_client;
use crate::k8s::gateway::KubeGateway;
use crate::metrics::Metrics;
use crate::status::StatusComposer;
use api::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(api::get_status))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(api::get_metrics))
        .with_state(state)
}

/// Run the status API until `cancel` fires.
pub async fn run(args: ServeArgs, cancel: CancellationToken) -> Result<()> {
    let watched = args.watched_namespaces();
    info!(
        port = args.port,
        watched_namespaces = ?watched,
        query_timeout_secs = args.query_timeout_secs,
        "Starting status server"
    );

    let client = build_client(args.context.as_deref())
        .await
        .context("Failed to create Kubernetes client")?;

    let mut registry = Registry::default();
    let metrics = Arc::new(Metrics::new(&mut registry));
    let registry = Arc::new(registry);

    let composer = StatusComposer::new(Arc::new(KubeGateway::new(client)))
        .with_selectors(args.selectors())
        .with_query_timeout(args.query_timeout())
        .with_watched_namespaces(watched)
        .with_metrics(metrics.clone());

    let state = AppState::new(Arc::new(composer), metrics, registry, cancel.clone());
    let health = state.health.clone();
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(addr = %addr, "Server listening");
    health.set_ready(true);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
            health.set_ready(false);
            info!("Server shutting down");
        })
        .await?;

    Ok(())
}
