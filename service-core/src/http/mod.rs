//! Outbound HTTP helpers.

pub mod retry;

pub use retry::{RetryConfig, Retryable, is_retryable_status, retry_call};
