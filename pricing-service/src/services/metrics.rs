//! Metrics module for pricing-service.
//! Provides Prometheus metrics for schema validation, metric lookups and matrix reconciliation.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// HTTP handler duration histogram
pub static HANDLER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "pricing_handler_duration_seconds",
            "Pricing handler duration"
        ),
        &["handler"]
    )
    .expect("Failed to register HANDLER_DURATION")
});

/// Schema validations by schema and outcome
pub static SCHEMA_VALIDATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Billable metrics API calls
pub static METRICS_API_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Billable metrics API call duration histogram
pub static METRICS_API_DURATION: OnceLock<HistogramVec> = OnceLock::new();

/// Matrix rows added or removed by reconciliation
pub static MATRIX_ROWS_RECONCILED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    SCHEMA_VALIDATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "pricing_schema_validations_total",
                "Total payload validations by schema and outcome"
            ),
            &["schema", "outcome"]
        )
        .expect("Failed to register SCHEMA_VALIDATIONS_TOTAL")
    });

    METRICS_API_REQUESTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "pricing_metrics_api_requests_total",
                "Total billable metrics API calls"
            ),
            &["method", "status"]
        )
        .expect("Failed to register METRICS_API_REQUESTS_TOTAL")
    });

    METRICS_API_DURATION.get_or_init(|| {
        register_histogram_vec!(
            histogram_opts!(
                "pricing_metrics_api_duration_seconds",
                "Billable metrics API call duration, retries included",
                vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
            ),
            &["method"]
        )
        .expect("Failed to register METRICS_API_DURATION")
    });

    MATRIX_ROWS_RECONCILED_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "pricing_matrix_rows_reconciled_total",
                "Matrix rows added or removed by reconciliation"
            ),
            &["change"]
        )
        .expect("Failed to register MATRIX_ROWS_RECONCILED_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*HANDLER_DURATION;
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record a schema validation outcome.
pub fn record_schema_validation(schema: &str, valid: bool) {
    if let Some(counter) = SCHEMA_VALIDATIONS_TOTAL.get() {
        let outcome = if valid { "valid" } else { "invalid" };
        counter.with_label_values(&[schema, outcome]).inc();
    }
}

/// Record a billable metrics API call.
pub fn record_metrics_api_request(method: &str, status: &str) {
    if let Some(counter) = METRICS_API_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[method, status]).inc();
    }
}

/// Record billable metrics API call duration.
pub fn record_metrics_api_duration(method: &str, duration_secs: f64) {
    if let Some(histogram) = METRICS_API_DURATION.get() {
        histogram.with_label_values(&[method]).observe(duration_secs);
    }
}

/// Record the rows touched by one reconciliation.
pub fn record_matrix_reconciliation(added: usize, removed: usize) {
    if let Some(counter) = MATRIX_ROWS_RECONCILED_TOTAL.get() {
        counter.with_label_values(&["added"]).inc_by(added as u64);
        counter.with_label_values(&["removed"]).inc_by(removed as u64);
    }
}

/// Record handler duration.
pub fn record_handler_duration(handler: &str, duration_secs: f64) {
    HANDLER_DURATION
        .with_label_values(&[handler])
        .observe(duration_secs);
}
