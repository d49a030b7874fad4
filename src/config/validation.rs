//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, backoff bounds ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("discovery.retry_base_ms ({base}) exceeds discovery.retry_max_ms ({max})")]
    BackoffBounds { base: u64, max: u64 },

    #[error("unknown log level {0:?}")]
    LogLevel(String),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }
    if config.listener.send_timeout_ms == Some(0) {
        errors.push(ValidationError::Zero {
            field: "listener.send_timeout_ms",
        });
    }

    let discovery = &config.discovery;
    if discovery.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero {
            field: "discovery.poll_interval_ms",
        });
    }
    if discovery.retry_base_ms == 0 {
        errors.push(ValidationError::Zero {
            field: "discovery.retry_base_ms",
        });
    }
    if discovery.retry_base_ms > discovery.retry_max_ms {
        errors.push(ValidationError::BackoffBounds {
            base: discovery.retry_base_ms,
            max: discovery.retry_max_ms,
        });
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = AppConfig::default();
        config.discovery.retry_base_ms = 60_000;
        config.observability.log_level = "loud".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BackoffBounds {
                    base: 60_000,
                    max: 30_000
                },
                ValidationError::LogLevel("loud".into()),
                ValidationError::MetricsAddress("nowhere".into()),
            ]
        );
    }

    #[test]
    fn metrics_address_ignored_when_disabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
