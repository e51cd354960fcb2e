use axum::Json;
use serde_json::Value;
use std::time::Instant;

use crate::models::{AddPriceComponent, CreatePlan, FeeType};
use crate::schema::{self, NormalizePrices, Schema};
use crate::services::{record_handler_duration, record_schema_validation};
use service_core::error::AppError;

/// Parse `payload` as `T`, recording the outcome.
fn check<T: Schema>(payload: &Value) -> Result<T, AppError> {
    match schema::parse::<T>(payload) {
        Ok(value) => {
            record_schema_validation(T::NAME, true);
            Ok(value)
        }
        Err(errors) => {
            record_schema_validation(T::NAME, false);
            tracing::debug!(
                schema = T::NAME,
                issues = errors.issues().len(),
                "Payload rejected"
            );
            Err(errors.into())
        }
    }
}

#[tracing::instrument(skip(payload))]
pub async fn validate_plan(Json(payload): Json<Value>) -> Result<Json<CreatePlan>, AppError> {
    let start = Instant::now();
    let plan = check::<CreatePlan>(&payload);
    record_handler_duration("validate_plan", start.elapsed().as_secs_f64());
    Ok(Json(plan?))
}

#[tracing::instrument(skip(payload))]
pub async fn validate_price_component(
    Json(payload): Json<Value>,
) -> Result<Json<AddPriceComponent>, AppError> {
    let start = Instant::now();
    let component = check::<AddPriceComponent>(&payload).map(|mut component| {
        component.normalize_prices();
        component
    });
    record_handler_duration("validate_price_component", start.elapsed().as_secs_f64());
    Ok(Json(component?))
}

#[tracing::instrument(skip(payload))]
pub async fn validate_fee(Json(payload): Json<Value>) -> Result<Json<FeeType>, AppError> {
    let start = Instant::now();
    let fee = check::<FeeType>(&payload).map(|mut fee| {
        fee.normalize_prices();
        fee
    });
    record_handler_duration("validate_fee", start.elapsed().as_secs_f64());
    Ok(Json(fee?))
}
