//! Command-line and environment options.
//!
//! Every flag can also be given as an upper-case environment variable
//! (`--route-extras` ↔ `ROUTE_EXTRAS`). Flags override the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{AppConfig, LogFormat};
use crate::config::validation::validate_config;

#[derive(Parser, Debug, Default)]
#[command(name = "centauri-broadcast")]
#[command(about = "Generates Centauri routes from container labels and broadcasts them to connected proxies")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, env = "CONFIG")]
    pub config: Option<PathBuf>,

    /// TCP address to listen on
    #[arg(long, env = "LISTEN")]
    pub listen: Option<String>,

    /// Lines to include in every route block
    #[arg(long, env = "ROUTE_EXTRAS")]
    pub route_extras: Option<String>,

    /// Only process containers with matching com.chameth.proxytag label
    #[arg(long, env = "PROXYTAG")]
    pub proxytag: Option<String>,

    /// JSON file holding the current container snapshot
    #[arg(long, env = "CONTAINERS")]
    pub containers: Option<PathBuf>,

    /// Give up on a send to one client after this many milliseconds
    #[arg(long, env = "SEND_TIMEOUT_MS")]
    pub send_timeout_ms: Option<u64>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

impl Cli {
    /// Load the config file (if any), apply overrides, and validate.
    pub fn resolve(self) -> Result<AppConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => load_config(path)?,
            None => AppConfig::default(),
        };
        let config = self.apply(base);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overlay the given options on `config`.
    pub fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if let Some(timeout) = self.send_timeout_ms {
            config.listener.send_timeout_ms = Some(timeout);
        }
        if let Some(extras) = self.route_extras {
            config.routes.extras = extras;
        }
        if let Some(tag) = self.proxytag {
            config.discovery.proxytag = Some(tag);
        }
        if let Some(path) = self.containers {
            config.discovery.containers_path = Some(path.to_string_lossy().into_owned());
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if let Some(addr) = self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = addr;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "centauri-broadcast",
            "--listen",
            "127.0.0.1:9999",
            "--route-extras",
            "tls auto",
            "--proxytag",
            "edge",
            "--log-format",
            "json",
        ])
        .unwrap();

        let config = cli.apply(AppConfig::default());
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.routes.extras, "tls auto");
        assert_eq!(config.discovery.proxytag.as_deref(), Some("edge"));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[listener]\nbind_address = \"127.0.0.1:1000\"\n[routes]\nextras = \"from file\""
        )
        .unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            listen: Some("127.0.0.1:2000".into()),
            ..Cli::default()
        };
        let config = cli.resolve().unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:2000");
        assert_eq!(config.routes.extras, "from file");
    }

    #[test]
    fn overrides_are_validated() {
        let cli = Cli {
            metrics_address: Some("not-an-address".into()),
            ..Cli::default()
        };
        assert!(matches!(cli.resolve(), Err(ConfigError::Validation(_))));
    }
}
