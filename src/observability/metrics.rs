//! Metrics collection and exposition.
//!
//! # Metrics
//! - `confbridge_denied_requests_total` (counter): denied requests by `handler`
//!   (`custom` or `default`)
//! - `confbridge_deny_handler_failures_total` (counter): failed custom handler runs
//! - `confbridge_custom_deny_handler_active` (gauge): 1 while a custom handler is armed
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder the calls are no-ops
//! - The Prometheus exporter is only started when an address is configured

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_denied(handler: &'static str) {
    counter!("confbridge_denied_requests_total", "handler" => handler).increment(1);
}

pub fn record_handler_failure() {
    counter!("confbridge_deny_handler_failures_total").increment(1);
}

pub fn record_custom_handler_active(active: bool) {
    gauge!("confbridge_custom_deny_handler_active").set(if active { 1.0 } else { 0.0 });
}
