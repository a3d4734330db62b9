//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sbi_requests_total` (counter): requests by route, status
//! - `sbi_request_duration_seconds` (histogram): dispatch latency by route
//! - `nrf_calls_total` (counter): registry calls by op, outcome
//! - `signaling_peers` (gauge): currently connected signaling peers
//! - `peer_notifications_total` (counter): unavailability notifications by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is optional and owns its own listener

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| e.to_string())?;

    describe_counter!("sbi_requests_total", "SBI requests by route and status");
    describe_histogram!("sbi_request_duration_seconds", "SBI dispatch latency in seconds");
    describe_counter!("nrf_calls_total", "NRF calls by operation and outcome");
    describe_gauge!("signaling_peers", "Connected signaling peers");
    describe_counter!("peer_notifications_total", "Peer unavailability notifications by outcome");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!("sbi_requests_total", "route" => route.to_string(), "status" => status.to_string()).increment(1);
    histogram!("sbi_request_duration_seconds", "route" => route.to_string()).record(start.elapsed().as_secs_f64());
}

pub fn record_nrf_call(op: &'static str, outcome: &'static str) {
    counter!("nrf_calls_total", "op" => op, "outcome" => outcome).increment(1);
}

pub fn set_signaling_peers(count: usize) {
    gauge!("signaling_peers").set(count as f64);
}

pub fn record_peer_notification(outcome: &'static str) {
    counter!("peer_notifications_total", "outcome" => outcome).increment(1);
}
