//! Client for the billable metrics RPC service.
//!
//! Calls use the Connect unary JSON convention: `POST {base}/{service}/{Method}`
//! with a JSON body, answered by a JSON message or a Connect error object.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use service_core::error::AppError;
use service_core::http::{is_retryable_status, retry_call, RetryConfig, Retryable};
use service_core::observability::TracedClientExt;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

use super::metrics::{record_metrics_api_duration, record_metrics_api_request};
use crate::config::MetricsApiConfig;
use crate::models::{BillableMetric, BillableMetricSummary};

#[derive(Debug, Error)]
pub enum MetricsClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("metrics api returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("metrics api response missing {0}")]
    MissingField(&'static str),
}

impl MetricsClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetricsClientError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

impl Retryable for MetricsClientError {
    fn is_retryable(&self) -> bool {
        match self {
            MetricsClientError::Transport(err) => err.is_retryable(),
            MetricsClientError::Status { status, .. } => is_retryable_status(*status),
            MetricsClientError::MissingField(_) => false,
        }
    }
}

impl From<MetricsClientError> for AppError {
    fn from(err: MetricsClientError) -> Self {
        if err.is_not_found() {
            AppError::NotFound(anyhow::anyhow!(err.to_string()))
        } else {
            AppError::BadGateway(err.to_string())
        }
    }
}

/// Reference data the usage fee editor needs from the metrics backend.
#[async_trait]
pub trait BillableMetricsApi: Send + Sync {
    async fn list_billable_metrics(
        &self,
        family_external_id: &str,
    ) -> Result<Vec<BillableMetricSummary>, MetricsClientError>;

    async fn get_billable_metric(&self, id: Uuid) -> Result<BillableMetric, MetricsClientError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListBillableMetricsRequest<'a> {
    family_external_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListBillableMetricsResponse {
    #[serde(default)]
    billable_metrics: Vec<BillableMetricSummary>,
}

#[derive(Serialize)]
struct GetBillableMetricRequest {
    id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetBillableMetricResponse {
    billable_metric: Option<BillableMetric>,
}

/// Connect error body.
#[derive(Deserialize)]
struct ConnectError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct ConnectMetricsClient {
    client: Client,
    base_url: String,
    service: String,
    timeout: Duration,
    retry: RetryConfig,
}

impl ConnectMetricsClient {
    pub fn new(config: &MetricsApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            service: config.service.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            retry: RetryConfig::with_max_retries(config.max_retries),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.service, method)
    }

    async fn call<Req, Resp>(&self, method: &str, request: &Req) -> Result<Resp, MetricsClientError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let url = self.method_url(method);
        let url = url.as_str();
        let start = Instant::now();

        let result = retry_call(&self.retry, method, move || self.call_once(url, request)).await;

        record_metrics_api_duration(method, start.elapsed().as_secs_f64());
        record_metrics_api_request(method, if result.is_ok() { "ok" } else { "error" });

        if let Err(e) = &result {
            tracing::warn!(method = method, error = %e, "Billable metrics call failed");
        }
        result
    }

    async fn call_once<Req, Resp>(&self, url: &str, request: &Req) -> Result<Resp, MetricsClientError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let response = self
            .client
            .traced_post(url)
            .header("connect-protocol-version", "1")
            .json(request)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Resp>().await?);
        }

        let message = match response.json::<ConnectError>().await {
            Ok(err) if !err.code.is_empty() => format!("{}: {}", err.code, err.message),
            Ok(err) => err.message,
            Err(_) => String::new(),
        };
        Err(MetricsClientError::Status { status, message })
    }
}

#[async_trait]
impl BillableMetricsApi for ConnectMetricsClient {
    #[tracing::instrument(skip(self))]
    async fn list_billable_metrics(
        &self,
        family_external_id: &str,
    ) -> Result<Vec<BillableMetricSummary>, MetricsClientError> {
        let response: ListBillableMetricsResponse = self
            .call(
                "ListBillableMetrics",
                &ListBillableMetricsRequest { family_external_id },
            )
            .await?;
        Ok(response.billable_metrics)
    }

    #[tracing::instrument(skip(self))]
    async fn get_billable_metric(&self, id: Uuid) -> Result<BillableMetric, MetricsClientError> {
        let response: GetBillableMetricResponse = self
            .call("GetBillableMetric", &GetBillableMetricRequest { id })
            .await?;
        response
            .billable_metric
            .ok_or(MetricsClientError::MissingField("billableMetric"))
    }
}
