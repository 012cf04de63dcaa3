//! Service wiring for the Vigil observability core.
//!
//! `vigil-core` assembles the individual subsystems — metric store, alert
//! engine, health runner, notification dispatcher, resilience executor,
//! error store — into one explicitly-constructed [`Monitor`] whose lifetime
//! the process entry point owns. All cross-subsystem seams (alert creation,
//! notification routing, health lookups) are connected here.
//!
//! # Example
//!
//! ```rust,no_run
//! use vigil_core::{Monitor, MonitorConfig};
//!
//! # async fn demo() {
//! let monitor = Monitor::new(MonitorConfig::from_env());
//! monitor.install_error_hooks();
//! monitor.start();
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod monitor;

// Re-export main types at crate root
pub use config::MonitorConfig;
pub use monitor::Monitor;
