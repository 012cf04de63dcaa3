//! Deduplicated error tracking for Vigil.
//!
//! `vigil-errors` collapses recurring exceptions into single
//! [`ErrorReport`] records keyed by a stable hash of
//! `(service, operation, kind, message)`, counts occurrences instead of
//! storing duplicates, escalates critical errors into immediate alerts, and
//! funnels process-wide failures (panics, failed background tasks) into the
//! same store.
//!
//! # Example
//!
//! ```rust
//! use vigil_errors::{ErrorContext, ErrorReportStore};
//!
//! let store = ErrorReportStore::new();
//!
//! for _ in 0..3 {
//!     store.handle(
//!         "ConnectionError",
//!         "pool exhausted",
//!         ErrorContext::new("cache", "get"),
//!     );
//! }
//!
//! assert_eq!(store.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod hooks;
pub mod report;

// Re-export main types at crate root
pub use error::{ErrorStoreError, Result};
pub use hooks::{install_panic_hook, report_task_failure};
pub use report::{
    ErrorContext, ErrorReport, ErrorReportStore, ErrorReportStoreConfig, ReportFilter,
};
