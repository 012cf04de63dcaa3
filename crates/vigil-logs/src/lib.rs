//! Bounded structured log storage for Vigil.
//!
//! `vigil-logs` keeps a fixed-size ring of structured [`LogEntry`] records
//! so the HTTP surface can answer `/logs` queries without touching the
//! tracing pipeline. Components append notable events (alerts raised, probes
//! failed, notifications dropped) alongside their normal `tracing` output.
//!
//! # Example
//!
//! ```rust
//! use vigil_logs::{LogEntry, LogFilter, LogLevel, LogStore};
//!
//! let store = LogStore::default();
//! store.append(LogEntry::now(LogLevel::Warn, "health", "probe timed out"));
//!
//! let results = store.query(&LogFilter::default(), 10);
//! assert_eq!(results.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod store;
pub mod types;

// Re-export main types at crate root
pub use store::{DEFAULT_MAX_ENTRIES, LogStore};
pub use types::{LogEntry, LogFilter, LogLevel};
