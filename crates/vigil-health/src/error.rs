//! Error types for the vigil-health crate.

use thiserror::Error;

/// Errors that can occur in the health-check system.
#[derive(Debug, Error)]
pub enum HealthError {
    /// A dependency with the given name was not found.
    #[error("dependency not found: {name}")]
    DependencyNotFound {
        /// The dependency name that was not found.
        name: String,
    },

    /// A dependency with the given name is already registered.
    #[error("dependency already registered: {name}")]
    AlreadyRegistered {
        /// The duplicate dependency name.
        name: String,
    },

    /// A probe exceeded its configured timeout.
    #[error("probe for '{name}' timed out after {timeout_ms}ms")]
    ProbeTimeout {
        /// The dependency name.
        name: String,
        /// The configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// A probe returned an error or panicked.
    #[error("probe for '{name}' failed: {reason}")]
    ProbeFailure {
        /// The dependency name.
        name: String,
        /// The failure reason.
        reason: String,
    },
}

/// Result type for health operations.
pub type Result<T> = std::result::Result<T, HealthError>;
