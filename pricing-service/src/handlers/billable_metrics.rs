use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::editor::{reconcile, ReconcileReport, NO_SEGMENTATION_PLACEHOLDER};
use crate::models::{BillableMetricSummary, DimensionRate};
use crate::services::record_matrix_reconciliation;
use crate::startup::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListBillableMetricsQuery {
    #[validate(length(min = 1, message = "familyExternalId cannot be empty"))]
    pub family_external_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBillableMetricsResponse {
    pub billable_metrics: Vec<BillableMetricSummary>,
}

#[tracing::instrument(skip(state))]
pub async fn list_billable_metrics(
    State(state): State<AppState>,
    Query(query): Query<ListBillableMetricsQuery>,
) -> Result<Json<ListBillableMetricsResponse>, AppError> {
    query.validate()?;

    let billable_metrics = state
        .metrics_api
        .list_billable_metrics(&query.family_external_id)
        .await?;

    Ok(Json(ListBillableMetricsResponse { billable_metrics }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileMatrixRequest {
    pub metric_id: Uuid,
    #[serde(default)]
    pub dimension_rates: Vec<DimensionRate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileMatrixResponse {
    pub metric_id: Uuid,
    pub headers: Vec<String>,
    pub dimension_rates: Vec<DimensionRate>,
    #[serde(flatten)]
    pub report: ReconcileReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

/// Reconcile the supplied matrix rows against the metric's current segmentation.
///
/// Rows are returned unchanged when the metric has no segmentation matrix.
#[tracing::instrument(skip(state, request), fields(metric_id = %request.metric_id))]
pub async fn reconcile_matrix(
    State(state): State<AppState>,
    Json(request): Json<ReconcileMatrixRequest>,
) -> Result<Json<ReconcileMatrixResponse>, AppError> {
    let metric = state
        .metrics_api
        .get_billable_metric(request.metric_id)
        .await?;

    let mut dimension_rates = request.dimension_rates;
    let Some(segmentation) = metric.segmentation_matrix else {
        return Ok(Json(ReconcileMatrixResponse {
            metric_id: request.metric_id,
            headers: Vec::new(),
            dimension_rates,
            report: ReconcileReport::default(),
            placeholder: Some(NO_SEGMENTATION_PLACEHOLDER),
        }));
    };

    let report = reconcile(&mut dimension_rates, &segmentation.combinations());
    record_matrix_reconciliation(report.added.len(), report.removed.len());
    tracing::info!(
        added = report.added.len(),
        removed = report.removed.len(),
        rows = dimension_rates.len(),
        "Matrix reconciled"
    );

    Ok(Json(ReconcileMatrixResponse {
        metric_id: request.metric_id,
        headers: segmentation.headers(),
        dimension_rates,
        report,
        placeholder: None,
    }))
}
