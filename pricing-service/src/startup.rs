//! Application startup and lifecycle management.

use crate::config::PricingConfig;
use crate::handlers;
use crate::services::{init_metrics, BillableMetricsApi, ConnectMetricsClient};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: PricingConfig,
    pub metrics_api: Arc<dyn BillableMetricsApi>,
}

/// Build the HTTP router for `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/v1/plans/validate", post(handlers::validate::validate_plan))
        .route(
            "/v1/price-components/validate",
            post(handlers::validate::validate_price_component),
        )
        .route("/v1/fees/validate", post(handlers::validate::validate_fee))
        .route(
            "/v1/billable-metrics",
            get(handlers::billable_metrics::list_billable_metrics),
        )
        .route(
            "/v1/fees/usage/matrix/reconcile",
            post(handlers::billable_metrics::reconcile_matrix),
        )
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: PricingConfig) -> Result<Self, AppError> {
        let metrics_api: Arc<dyn BillableMetricsApi> =
            Arc::new(ConnectMetricsClient::new(&config.metrics_api));
        Self::build_with_api(config, metrics_api).await
    }

    /// Build the application around an existing metrics API client.
    pub async fn build_with_api(
        config: PricingConfig,
        metrics_api: Arc<dyn BillableMetricsApi>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let state = AppState {
            config: config.clone(),
            metrics_api,
        };

        // Port 0 binds a random port for testing
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %http_addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(
            http_port = http_port,
            metrics_api_url = %config.metrics_api.url,
            "Pricing service listener bound"
        );

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let http_router = router(self.state);

        tracing::info!(
            service = "pricing-service",
            version = env!("CARGO_PKG_VERSION"),
            http_port = self.http_port,
            "Service ready to accept connections"
        );

        axum::serve(self.http_listener, http_router)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP server error");
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
