//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_error_responses_total` (counter): error responses by `status`
//! - `gateway_stream_messages_total` (counter): stream elements delivered
//! - `gateway_streams_total` (counter): finished streams by `outcome`

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_error_response(status: u16) {
    counter!("gateway_error_responses_total", "status" => status.to_string()).increment(1);
}

pub fn record_stream_message() {
    counter!("gateway_stream_messages_total").increment(1);
}

pub fn record_stream_end(outcome: &'static str) {
    counter!("gateway_streams_total", "outcome" => outcome).increment(1);
}
