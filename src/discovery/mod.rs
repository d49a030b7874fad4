//! Container discovery subsystem.
//!
//! # Data Flow
//! ```text
//! source.rs (watched JSON snapshot standing in for runtime events, retry with backoff)
//!     → mpsc channel of full snapshots
//!     → monitor.rs
//!         → filter.rs (vhost label present, proxy tag matches)
//!         → builder::build
//!         → BroadcastServer::broadcast
//! ```
//!
//! # Design Decisions
//! - The channel is the seam: any producer of `Vec<Container>` can feed the monitor
//! - Each snapshot is the complete container set, never a diff

pub mod filter;
pub mod monitor;
pub mod source;

pub use filter::LabelFilter;
pub use monitor::Monitor;
pub use source::{load_snapshot, FileSource, SourceError};
