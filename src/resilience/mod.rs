//! Resilience patterns.
//!
//! Container sources reconnect with exponential backoff and jitter so a
//! flapping source does not spin.

pub mod backoff;
