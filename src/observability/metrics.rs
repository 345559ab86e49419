//! Metrics collection and exposition.
//!
//! # Metrics
//! - `clustercheck_checks_total` (counter): checks by outcome and reason
//! - `clustercheck_check_duration_seconds` (histogram): end-to-end check latency
//! - `clustercheck_probe_retries_total` (counter): retry sleeps by stage
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus endpoint is opt-in

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::Verdict;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one check.
pub fn record_check(verdict: &Verdict, started: Instant) {
    let (outcome, reason) = match verdict {
        Verdict::Available => ("available", "none"),
        Verdict::Unavailable(reason) => ("unavailable", reason.kind()),
    };

    metrics::counter!("clustercheck_checks_total", "outcome" => outcome, "reason" => reason)
        .increment(1);
    metrics::histogram!("clustercheck_check_duration_seconds")
        .record(started.elapsed().as_secs_f64());
}

/// Record one retry sleep in a probe stage.
pub fn record_retry(stage: &'static str) {
    metrics::counter!("clustercheck_probe_retries_total", "stage" => stage).increment(1);
}
