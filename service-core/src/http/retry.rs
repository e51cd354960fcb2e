//! Retry utilities for outbound HTTP/RPC calls.
//!
//! Provides configurable retry logic with exponential backoff. Callers classify
//! their own error type through [`Retryable`].

use reqwest::StatusCode;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Initial backoff duration before first retry.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to backoff duration.
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the specified max retries.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let backoff_ms = backoff.min(self.max_backoff.as_millis() as f64) as u64;

        let mut duration = Duration::from_millis(backoff_ms);

        if self.add_jitter {
            // Add up to 25% jitter
            let jitter = (backoff_ms as f64 * 0.25 * rand_jitter()) as u64;
            duration += Duration::from_millis(jitter);
        }

        duration
    }
}

/// Simple pseudo-random jitter (0.0 to 1.0) without external dependencies.
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}

/// Classifies an error as transient.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Determines if an HTTP status from an upstream service is worth retrying.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

impl Retryable for reqwest::Error {
    fn is_retryable(&self) -> bool {
        if self.is_timeout() || self.is_connect() {
            return true;
        }
        self.status().map(is_retryable_status).unwrap_or(false)
    }
}

/// Execute an outbound call with retry logic.
///
/// # Example
/// ```ignore
/// let metric = retry_call(&RetryConfig::default(), "get_billable_metric", || async {
///     client.get_billable_metric(id).await
/// })
/// .await?;
/// ```
pub async fn retry_call<F, Fut, T, E>(config: &RetryConfig, operation_name: &str, f: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "Call succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_retryable() {
                    warn!(
                        operation = operation_name,
                        error = %err,
                        "Call failed with non-retryable error"
                    );
                    return Err(err);
                }

                if attempt >= config.max_retries {
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        error = %err,
                        "Call failed after max retries"
                    );
                    return Err(err);
                }

                let backoff = config.backoff_duration(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    error = %err,
                    backoff_ms = backoff.as_millis(),
                    "Call failed, retrying after backoff"
                );

                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}
