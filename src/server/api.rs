use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use prometheus_client::registry::Registry;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::VERSION;
use crate::error::StatusError;
use crate::health::HealthState;
use crate::metrics::{self, Metrics};
use crate::status::{StatusComposer, StatusResponse};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<StatusComposer>,
    pub health: HealthState,
    pub metrics: Arc<Metrics>,
    pub registry: Arc<Registry>,
    /// Cancelled on shutdown; each request composes under a child token.
    pub cancel: CancellationToken,
    /// Version compared against the client's `version` parameter.
    pub server_version: String,
}

impl AppState {
    pub fn new(
        composer: Arc<StatusComposer>,
        metrics: Arc<Metrics>,
        registry: Arc<Registry>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            composer,
            health: HealthState::new(),
            metrics,
            registry,
            cancel,
            server_version: VERSION.to_string(),
        }
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(state: &AppState) -> Self {
        state.health.clone()
    }
}

/// Query parameters for the status endpoint
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub namespace: Option<String>,
    pub version: Option<String>,
}

/// Status report for one namespace.
///
/// Always answers 200; failures are carried in the envelope code, including
/// query strings that do not decode.
pub async fn get_status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Json<StatusResponse> {
    let response = match query {
        Ok(Query(params)) => status_for(&state, params).await,
        Err(rejection) => {
            StatusResponse::from_result(Err(StatusError::InvalidNamespace(rejection.body_text())))
        }
    };

    state.metrics.record_response(response.status.code);
    Json(response)
}

async fn status_for(state: &AppState, params: StatusQuery) -> StatusResponse {
    let namespace = params.namespace.unwrap_or_default();
    debug!(namespace = %namespace, client_version = ?params.version, "Status request received");

    match params.version.as_deref() {
        Some(version) if !version.is_empty() && version != state.server_version => {
            warn!(
                client_version = %version,
                server_version = %state.server_version,
                "Rejecting status request from mismatched client"
            );
            StatusResponse::version_mismatch()
        }
        _ => {
            let cancel = state.cancel.child_token();
            let composed = state.composer.compose(&namespace, &cancel).await;
            StatusResponse::from_result(composed.map(|composition| composition.report))
        }
    }
}

/// OpenMetrics text for the registry.
pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match metrics::render(&state.registry) {
        Ok(buf) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "application/openmetrics-text; version=1.0.0; charset=utf-8",
            )],
            buf,
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "Failed to encode metrics".to_string(),
        ),
    }
}
