//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML and carry
//! defaults so that a minimal (or empty) file is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Broadcast listener settings.
    pub listener: ListenerConfig,

    /// Route generation settings.
    pub routes: RoutesConfig,

    /// Container discovery settings.
    pub discovery: DiscoveryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Broadcast listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-message send timeout in milliseconds. Unset means wait forever.
    pub send_timeout_ms: Option<u64>,

    /// Pause after a failed accept, in milliseconds.
    pub accept_error_delay_ms: u64,
}

impl ListenerConfig {
    pub fn send_timeout(&self) -> Option<Duration> {
        self.send_timeout_ms.map(Duration::from_millis)
    }

    pub fn accept_error_delay(&self) -> Duration {
        Duration::from_millis(self.accept_error_delay_ms)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            send_timeout_ms: None,
            accept_error_delay_ms: 100,
        }
    }
}

/// Route generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RoutesConfig {
    /// Lines included verbatim in every route block.
    pub extras: String,
}

/// Container discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Path of the JSON container snapshot file.
    pub containers_path: Option<String>,

    /// Only process containers whose `com.chameth.proxytag` label matches.
    pub proxytag: Option<String>,

    /// Poll interval for the file watcher in milliseconds.
    pub poll_interval_ms: u64,

    /// Base delay for reconnect backoff in milliseconds.
    pub retry_base_ms: u64,

    /// Maximum delay for reconnect backoff in milliseconds.
    pub retry_max_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            containers_path: None,
            proxytag: None,
            poll_interval_ms: 2000,
            retry_base_ms: 1000,
            retry_max_ms: 30_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
