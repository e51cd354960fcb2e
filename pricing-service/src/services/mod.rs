//! Services module for pricing-service.

pub mod billable_metrics;
pub mod metrics;

pub use billable_metrics::{BillableMetricsApi, ConnectMetricsClient, MetricsClientError};
pub use metrics::{
    get_metrics, init_metrics, record_handler_duration, record_matrix_reconciliation,
    record_metrics_api_duration, record_metrics_api_request, record_schema_validation,
};
