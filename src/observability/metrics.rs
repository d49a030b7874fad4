//! Metrics collection and exposition.
//!
//! # Metrics
//! - `centauri_clients_connected` (gauge): currently registered clients
//! - `centauri_broadcasts_total` (counter): broadcast calls
//! - `centauri_messages_sent_total` (counter): frames delivered, by kind
//! - `centauri_send_failures_total` (counter): frames abandoned, by kind
//! - `centauri_config_bytes` (gauge): size of the last broadcast payload
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Kind of frame being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Last known payload pushed to a newly connected client.
    Sync,
    /// Payload pushed to every client on change.
    Broadcast,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Sync => "sync",
            MessageKind::Broadcast => "broadcast",
        }
    }
}

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_clients(count: usize) {
    metrics::gauge!("centauri_clients_connected").set(count as f64);
}

pub fn record_broadcast(payload_len: usize) {
    metrics::counter!("centauri_broadcasts_total").increment(1);
    metrics::gauge!("centauri_config_bytes").set(payload_len as f64);
}

pub fn record_send(kind: MessageKind, ok: bool) {
    if ok {
        metrics::counter!("centauri_messages_sent_total", "kind" => kind.as_str()).increment(1);
    } else {
        metrics::counter!("centauri_send_failures_total", "kind" => kind.as_str()).increment(1);
    }
}
