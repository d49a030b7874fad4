//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig
//!     → command-line / environment overrides (main.rs)
//!     → validated again, then handed to each subsystem
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the file is optional
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, DiscoveryConfig, ListenerConfig, LogFormat, ObservabilityConfig, RoutesConfig};
