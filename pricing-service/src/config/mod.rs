//! Configuration module for pricing-service.

use service_core::config::{self as core_config, get_env, get_env_parsed};
use service_core::error::AppError;
use std::env;

pub const DEFAULT_METRICS_API_SERVICE: &str = "api.billablemetrics.v1.BillableMetricsService";

#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub metrics_api: MetricsApiConfig,
}

/// Where the billable metrics RPC service lives.
#[derive(Debug, Clone)]
pub struct MetricsApiConfig {
    pub url: String,
    pub service: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl PricingConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = common.is_production();

        Ok(Self {
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "pricing-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            metrics_api: MetricsApiConfig {
                url: get_env("METRICS_API_URL", Some("http://metering-api:8080"), is_prod)?,
                service: env::var("METRICS_API_SERVICE")
                    .unwrap_or_else(|_| DEFAULT_METRICS_API_SERVICE.to_string()),
                timeout_ms: get_env_parsed("METRICS_API_TIMEOUT_MS", 5_000),
                max_retries: get_env_parsed("METRICS_API_MAX_RETRIES", 2),
            },
            common,
        })
    }
}
