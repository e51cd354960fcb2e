//! Health check integration tests for pricing-service.

mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;

    assert!(response.status().is_success());
    assert!(response.headers().get("x-request-id").is_some());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "pricing-service");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn().await;

    let response = app.get("/ready").await;

    assert!(response.status().is_success());
}

#[tokio::test]
async fn metrics_endpoint_works() {
    let app = TestApp::spawn().await;

    // Produce at least one sample
    app.post_json(
        "/v1/fees/validate",
        &serde_json::json!({"fee": "oneTime", "data": {"unitPrice": "5", "quantity": 1}}),
    )
    .await;

    let response = app.get("/metrics").await;

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap_or("").contains("text/plain"))
        .unwrap_or(false));

    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("pricing_schema_validations_total"));
}
