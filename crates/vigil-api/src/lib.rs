//! REST API for the Vigil observability core.
//!
//! `vigil-api` exposes the assembled [`Monitor`](vigil_core::Monitor) over
//! HTTP: metric reads and writes, health aggregates and forced probes,
//! alert/log/error queries with idempotent resolve endpoints, circuit
//! breaker snapshots, a load-balancer `/status` probe, and a channel test
//! endpoint.
//!
//! # Example
//!
//! ```rust,no_run
//! use vigil_api::ApiServer;
//! use vigil_core::{Monitor, MonitorConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let monitor = Monitor::new(MonitorConfig::default());
//! let server = ApiServer::new(monitor.clone());
//!
//! monitor.start();
//! server.serve(monitor.config().bind_addr).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod types;

// Re-export main types at crate root
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use server::ApiServer;
pub use state::ApiState;
