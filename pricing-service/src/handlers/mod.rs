//! HTTP handlers for pricing-service.

pub mod billable_metrics;
pub mod validate;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "pricing-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint for K8s readiness probes.
pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
