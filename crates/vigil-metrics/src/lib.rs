//! Bounded in-memory time-series storage for Vigil.
//!
//! `vigil-metrics` provides the leaf store the rest of the observability
//! core builds on: named, timestamped numeric samples with units and tags,
//! kept in a per-name history that never exceeds a fixed cap.
//!
//! # Features
//!
//! - **Bounded histories**: each metric name keeps at most `max_history`
//!   samples, evicted oldest-first on every write
//! - **Snapshots**: `history()` returns a point-in-time copy, most-recent-last
//! - **Collectors**: the [`MetricCollector`] trait feeds periodic samples
//!   into the store
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use vigil_metrics::{MetricName, MetricStore};
//!
//! let store = MetricStore::default();
//! let name = MetricName::new("system.cpu.usage").unwrap();
//!
//! store.record(name.clone(), 42.5, "percent", HashMap::new());
//! assert_eq!(store.latest(&name), Some(42.5));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod collector;
pub mod error;
pub mod store;
pub mod types;

// Re-export main types at crate root
pub use collector::{MetricCollector, RuntimeMetricsCollector, Sample};
pub use error::{MetricsError, Result};
pub use store::{DEFAULT_MAX_HISTORY, MetricStore};
pub use types::{Metric, MetricName, now_timestamp};
