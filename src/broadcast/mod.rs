//! Configuration distribution subsystem.
//!
//! # Data Flow
//! ```text
//! accept loop (server.rs)
//!     → register client, send last payload (sync message)
//!     → per-client reader task: discard bytes until EOF/error → remove
//!
//! broadcast(document)
//!     → replace last payload + snapshot clients (exclusive lock)
//!     → outside the lock: write one frame (protocol.rs) to each client
//! ```
//!
//! # Design Decisions
//! - One RwLock guards both the client set and the last payload
//! - The lock is never held across a network write
//! - Only the reader task removes a client; broadcast just logs failures
//! - Per-client writer mutex keeps frames whole and in order

pub mod client;
pub mod protocol;
pub mod server;

pub use protocol::{read_frame, write_frame, ProtocolError};
pub use server::{BroadcastReport, BroadcastServer, SendError, ServerError};
