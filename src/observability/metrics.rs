//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sidecar_requests_total` (counter): requests by method, status
//! - `sidecar_request_duration_seconds` (histogram): handler latency
//! - `sidecar_sink_failures_total` (counter): records that could not be written
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   exporter every call is a no-op
//! - The Prometheus endpoint is opt-in

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, started: Instant) {
    metrics::counter!(
        "sidecar_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("sidecar_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Record a record that failed to reach the log file set.
pub fn record_sink_failure() {
    metrics::counter!("sidecar_sink_failures_total").increment(1);
}
