//! Trace propagation for outbound HTTP calls.
//!
//! Outbound requests carry the W3C `traceparent`/`tracestate` of the current
//! span plus the inbound `x-request-id`, so the upstream service's logs line up
//! with ours.

use opentelemetry::trace::TraceContextExt;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::middleware::{REQUEST_ID_HEADER, current_request_id};

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const TRACESTATE_HEADER: &str = "tracestate";

/// Headers to attach to an outbound call made on behalf of the current span.
///
/// Empty when there is neither a sampled span nor a request id.
pub fn outbound_headers(request_id: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let context = Span::current().context();
    let span_context = context.span().span_context().clone();
    if span_context.is_valid() {
        // version-trace_id-span_id-trace_flags
        let traceparent = format!(
            "00-{}-{}-{:02x}",
            span_context.trace_id(),
            span_context.span_id(),
            span_context.trace_flags().to_u8()
        );
        if let Ok(value) = traceparent.parse() {
            headers.insert(TRACEPARENT_HEADER, value);
        }

        let trace_state = span_context.trace_state().header();
        if !trace_state.is_empty()
            && let Ok(value) = trace_state.parse()
        {
            headers.insert(TRACESTATE_HEADER, value);
        }
    }

    if let Some(id) = request_id
        && let Ok(value) = id.parse()
    {
        headers.insert(REQUEST_ID_HEADER, value);
    }

    headers
}

/// A POST whose trace headers are resolved when it is sent.
pub struct TracedRequest {
    request: reqwest::RequestBuilder,
}

impl TracedRequest {
    pub fn header(self, key: &str, value: &str) -> Self {
        Self {
            request: self.request.header(key, value),
        }
    }

    pub fn json<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        Self {
            request: self.request.json(json),
        }
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            request: self.request.timeout(timeout),
        }
    }

    /// Send with the current span's trace context and the inbound request id.
    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let headers = outbound_headers(current_request_id().as_deref());
        self.request.headers(headers).send().await
    }
}

pub trait TracedClientExt {
    fn traced_post(&self, url: &str) -> TracedRequest;
}

impl TracedClientExt for reqwest::Client {
    fn traced_post(&self, url: &str) -> TracedRequest {
        TracedRequest {
            request: self.post(url),
        }
    }
}
