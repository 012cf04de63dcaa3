//! Dependency health checking for Vigil.
//!
//! `vigil-health` orchestrates asynchronous health probes over registered
//! service dependencies: each probe runs with its own timeout, its result
//! overwrites the single live [`HealthCheck`] record for that dependency,
//! failing probes raise alerts through the shared creation gateway, and
//! probe latency feeds the metric store as a side-channel.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vigil_health::{FnProbe, HealthCheckRunner, HealthRegistry, ProbeReport, ServiceDependency};
//! # use vigil_alerts::AlertEngine;
//! # use vigil_metrics::MetricStore;
//!
//! # async fn demo() {
//! let metrics = MetricStore::default();
//! let engine = Arc::new(AlertEngine::new(metrics.clone()));
//!
//! let registry = HealthRegistry::new();
//! registry
//!     .register(
//!         ServiceDependency::new(
//!             "db",
//!             "database",
//!             Arc::new(FnProbe::new(|| async { Ok(ProbeReport::healthy("pool ok")) })),
//!         )
//!         .timeout(Duration::from_secs(2)),
//!     )
//!     .unwrap();
//!
//! let runner = HealthCheckRunner::new(registry, engine, metrics);
//! runner.run_all().await;
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod probe;
pub mod runner;
pub mod types;

// Re-export main types at crate root
pub use error::{HealthError, Result};
pub use probe::{BoxFuture, DependencyProbe, FnProbe, ProbeOutcome};
pub use runner::{HealthCheckRunner, HealthRegistry, ServiceDependency};
pub use types::{HealthCheck, HealthStatus, HealthSummary, ProbeReport};
