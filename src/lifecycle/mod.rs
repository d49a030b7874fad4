//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Bind broadcast server → Monitor containers
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → Stop accept loop and monitor → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: a bind or config error is fatal before monitoring starts
//! - Open client connections are not drained; they close with the process

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
