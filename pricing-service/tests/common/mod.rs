//! Test helper module for pricing-service integration tests.
//!
//! Spawns the service on a random port against a mock billable metrics backend.

#![allow(dead_code)]

use pricing_service::config::{MetricsApiConfig, PricingConfig, DEFAULT_METRICS_API_SERVICE};
use pricing_service::services::init_metrics;
use pricing_service::startup::Application;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const METRIC_ID: &str = "6a2c6c1e-7c36-4c36-9c55-8b3c0b5b4c11";
pub const FAMILY: &str = "default";

pub fn metric_id() -> Uuid {
    Uuid::parse_str(METRIC_ID).unwrap()
}

/// Path of a method on the billable metrics service.
pub fn rpc_path(method: &str) -> String {
    format!("/{}/{}", DEFAULT_METRICS_API_SERVICE, method)
}

pub fn test_config(metrics_api_url: &str) -> PricingConfig {
    PricingConfig {
        common: CoreConfig {
            port: 0, // Random port
            environment: "test".to_string(),
        },
        service_name: "pricing-service-test".to_string(),
        service_version: "0.1.0".to_string(),
        log_level: "warn".to_string(),
        otlp_endpoint: None,
        metrics_api: MetricsApiConfig {
            url: metrics_api_url.to_string(),
            service: DEFAULT_METRICS_API_SERVICE.to_string(),
            timeout_ms: 2_000,
            max_retries: 1,
        },
    }
}

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    pub metrics_api: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a new test application on a random port.
    pub async fn spawn() -> Self {
        // Initialize metrics (required for metrics endpoint test)
        init_metrics();

        let metrics_api = MockServer::start().await;
        let config = test_config(&metrics_api.uri());

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            http_port,
            metrics_api,
            client,
        }
    }

    pub async fn post_json(&self, route: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.http_address, route))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, route: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.http_address, route))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Serve `metric` from GetBillableMetric.
    pub async fn mock_metric(&self, metric: Value) {
        Mock::given(method("POST"))
            .and(path(rpc_path("GetBillableMetric")))
            .and(body_json(json!({"id": METRIC_ID})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "billableMetric": metric
            })))
            .mount(&self.metrics_api)
            .await;
    }

    /// Serve `metrics` from ListBillableMetrics for [`FAMILY`].
    pub async fn mock_metric_list(&self, metrics: Value) {
        Mock::given(method("POST"))
            .and(path(rpc_path("ListBillableMetrics")))
            .and(body_json(json!({"familyExternalId": FAMILY})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "billableMetrics": metrics
            })))
            .mount(&self.metrics_api)
            .await;
    }
}

/// Metric detail segmented by a single `region` dimension.
pub fn region_metric(regions: &[&str]) -> Value {
    json!({
        "id": METRIC_ID,
        "name": "API calls",
        "segmentationMatrix": {
            "single": {"dimension": {"key": "region", "values": regions}}
        }
    })
}
