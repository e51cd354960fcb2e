//! Schema validation endpoint tests.

mod common;

use common::{TestApp, METRIC_ID};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn issue_paths(body: &Value) -> Vec<String> {
    body["issues"]
        .as_array()
        .expect("issues array")
        .iter()
        .map(|i| i["path"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn valid_usage_fee_is_normalized() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/v1/fees/validate",
            &json!({
                "fee": "usage",
                "data": {
                    "metricId": METRIC_ID,
                    "model": {
                        "model": "tiered",
                        "data": {"rows": [
                            {"firstUnit": 0, "unitPrice": "0,10"},
                            {"firstUnit": 1000, "unitPrice": "0.05", "flatFee": "2,5"}
                        ]}
                    }
                }
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let rows = &body["data"]["model"]["data"]["rows"];
    assert_eq!(rows[0]["unitPrice"], "0.10");
    assert_eq!(rows[1]["flatFee"], "2.5");
}

#[tokio::test]
async fn out_of_order_tiers_are_reported_per_row() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/v1/fees/validate",
            &json!({
                "fee": "usage",
                "data": {
                    "metricId": METRIC_ID,
                    "model": {
                        "model": "volume",
                        "data": {"rows": [
                            {"firstUnit": 0, "unitPrice": "1"},
                            {"firstUnit": 100, "unitPrice": "1"},
                            {"firstUnit": 100, "unitPrice": "1"}
                        ]}
                    }
                }
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation error");
    assert_eq!(issue_paths(&body), vec!["data.model.data.rows.2.firstUnit"]);
    assert_eq!(body["issues"][0]["code"], "tier_order");
}

#[tokio::test]
async fn unknown_model_discriminant_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/v1/fees/validate",
            &json!({
                "fee": "usage",
                "data": {"metricId": METRIC_ID, "model": {"model": "graduated", "data": {}}}
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(issue_paths(&body), vec!["data.model.model"]);
}

#[tokio::test]
async fn price_component_reports_every_issue() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/v1/price-components/validate",
            &json!({
                "planVersionId": "pv_1",
                "name": "",
                "fee": {
                    "fee": "rate",
                    "data": {"rates": [
                        {"term": "MONTHLY", "price": "12.999"},
                        {"term": "ANNUAL", "price": "abc"}
                    ]}
                }
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        issue_paths(&body),
        vec!["fee.data.rates.0.price", "fee.data.rates.1.price", "name"]
    );
}

#[tokio::test]
async fn valid_price_component_round_trips() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/v1/price-components/validate",
            &json!({
                "planVersionId": "pv_1",
                "name": "Seats",
                "fee": {
                    "fee": "slot",
                    "data": {
                        "rates": [{"term": "MONTHLY", "price": "9,99"}],
                        "slotUnitName": "seat",
                        "upgradePolicy": "PRORATED",
                        "downgradePolicy": "REMOVE_AT_END_OF_PERIOD",
                        "minimumCount": 1
                    }
                }
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["fee"]["data"]["rates"][0]["price"], "9.99");
    assert_eq!(body["planVersionId"], "pv_1");
}

#[tokio::test]
async fn create_plan_rules_apply() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/v1/plans/validate",
            &json!({"planName": "Growth", "externalId": "GR"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert!(issue_paths(&body).iter().all(|p| p == "externalId"));

    let response = app
        .post_json(
            "/v1/plans/validate",
            &json!({"planName": "Growth", "externalId": "growth-2024"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["planType"], "STANDARD");
}

#[tokio::test]
async fn mistyped_fields_are_reported_at_their_path() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/v1/fees/validate",
            &json!({
                "fee": "usage",
                "data": {
                    "metricId": METRIC_ID,
                    "model": {
                        "model": "volume",
                        "data": {"rows": [
                            {"firstUnit": -1, "unitPrice": "1"},
                            {"firstUnit": 10}
                        ]}
                    }
                }
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        issue_paths(&body),
        vec![
            "data.model.data.rows.0.firstUnit",
            "data.model.data.rows.1.unitPrice"
        ]
    );
    assert_eq!(body["issues"][1]["message"], "Required");
}
