//! Service middleware for metrics and request tracking.
//!
//! ## Metrics Exposed
//!
//! All metrics are `info!` events on the `blueprint_kernel::metrics` target,
//! aggregated from logs:
//!
//! - `request_metric` - path, method, status, latency
//! - `parse_metric` - syntax, mode, outcome, prompt count, latency
//! - `cache_metric` - cache hit or miss per parse

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

/// Metrics middleware that records request counts and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        target: "blueprint_kernel::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request_metric"
    );

    response
}

/// Record one parse.
///
/// `error_code` is `None` on success.
pub fn record_parse_metrics(
    syntax: &str,
    mode: &str,
    prompt_count: usize,
    error_code: Option<&str>,
    latency_us: u64,
) {
    info!(
        target: "blueprint_kernel::metrics",
        metric_type = "parse",
        syntax = syntax,
        mode = mode,
        outcome = if error_code.is_some() { "error" } else { "ok" },
        error_code = error_code.unwrap_or(""),
        prompt_count = prompt_count,
        latency_us = latency_us,
        "parse_metric"
    );
}

/// Record a parse cache lookup.
pub fn record_cache_lookup(hit: bool) {
    info!(
        target: "blueprint_kernel::metrics",
        metric_type = "cache",
        result = if hit { "hit" } else { "miss" },
        "cache_metric"
    );
}
