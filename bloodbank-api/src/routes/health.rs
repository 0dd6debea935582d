use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use bloodbank_shared::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

/// Health check that probes the store.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let database = match state.store.ping() {
        Ok(()) => HealthCheck::new("database", HealthStatus::Healthy),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            HealthCheck::new("database", HealthStatus::Unhealthy).with_message(e.to_string())
        }
    };

    let response = HealthResponse::healthy("bloodbank-api", env!("CARGO_PKG_VERSION"))
        .with_checks(vec![database]);

    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response)).into_response()
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
