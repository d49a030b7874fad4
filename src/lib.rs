//! Centauri route broadcaster.
//!
//! Watches a container snapshot, turns container labels into a Centauri
//! route configuration and pushes every new configuration to all connected
//! proxies over a small framed TCP protocol.

// Core subsystems
pub mod broadcast;
pub mod builder;
pub mod discovery;
pub mod net;

// Cross-cutting concerns
pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use broadcast::BroadcastServer;
pub use config::AppConfig;
pub use lifecycle::Shutdown;
