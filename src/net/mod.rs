//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, accept)
//!     → Hand off to the broadcast server
//! ```
//!
//! # Design Decisions
//! - No connection limit: every client is tracked until it disconnects
//! - Bind failures are fatal, accept failures are not

pub mod listener;
