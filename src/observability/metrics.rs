//! Metrics collection and exposition.
//!
//! # Metrics
//! - `jqhttp_requests_total` (counter): requests by route, method, status
//! - `jqhttp_request_duration_seconds` (histogram): latency by route
//! - `jqhttp_transform_total` (counter): transform outcomes by side
//! - `jqhttp_errors_total` (counter): failed exchanges by route and kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::error::Side;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished exchange.
pub fn record_request(route: &str, method: &str, status: u16, start: Instant) {
    counter!(
        "jqhttp_requests_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("jqhttp_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record how a transform treated one body.
pub fn record_transform(side: Side, outcome: &'static str) {
    counter!(
        "jqhttp_transform_total",
        "side" => side.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record an exchange that ended in an error envelope.
pub fn record_error(route: &str, kind: &'static str) {
    counter!(
        "jqhttp_errors_total",
        "route" => route.to_string(),
        "kind" => kind
    )
    .increment(1);
}
