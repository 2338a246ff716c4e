//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_flows_total` (counter): observed flows by outcome
//!   (`filtered`, `info`, `error`, `critical`, `abandoned`)
//! - `relay_deliveries_total` (counter): deliveries by action and outcome
//! - `relay_delivery_attempts` (histogram): attempts per delivery
//! - `relay_delivery_duration_seconds` (histogram): time spent delivering, retries included
//! - `relay_in_flight_flows` (gauge): records waiting for a response
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_flow(outcome: &'static str) {
    metrics::counter!("relay_flows_total", "outcome" => outcome).increment(1);
}

pub fn record_in_flight(count: usize) {
    metrics::gauge!("relay_in_flight_flows").set(count as f64);
}

/// Record a finished delivery (successful or not).
pub fn record_delivery(action: &'static str, outcome: &'static str, attempts: u32, started: Instant) {
    metrics::counter!("relay_deliveries_total", "action" => action, "outcome" => outcome).increment(1);
    metrics::histogram!("relay_delivery_attempts", "action" => action).record(attempts as f64);
    metrics::histogram!("relay_delivery_duration_seconds", "action" => action)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_delivery_dropped(action: &'static str, reason: &'static str) {
    metrics::counter!("relay_deliveries_total", "action" => action, "outcome" => "dropped", "reason" => reason)
        .increment(1);
}
