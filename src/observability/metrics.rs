//! Metrics collection and exposition.
//!
//! # Metrics
//! - `secure_headers_applied_total` (counter): headers appended, by header
//! - `secure_headers_failures_total` (counter): headers that could not be built, by header
//! - `secure_headers_reloads_total` (counter): configuration reloads, by outcome

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_header_applied(header: &str) {
    ::metrics::counter!("secure_headers_applied_total", "header" => header.to_string()).increment(1);
}

pub fn record_injection_failure(header: &str) {
    ::metrics::counter!("secure_headers_failures_total", "header" => header.to_string()).increment(1);
}

pub fn record_reload(outcome: &'static str) {
    ::metrics::counter!("secure_headers_reloads_total", "outcome" => outcome).increment(1);
}
