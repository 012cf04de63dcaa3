//! Error types for the vigil-alerts crate.

use thiserror::Error;

/// Errors that can occur in the alerting system.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Invalid alert rule configuration.
    #[error("invalid alert rule: {reason}")]
    InvalidRule {
        /// The reason the rule is invalid.
        reason: String,
    },

    /// Alert with the given ID was not found.
    #[error("alert not found: {id}")]
    AlertNotFound {
        /// The alert ID that was not found.
        id: String,
    },

    /// A condition could not be evaluated (malformed condition, missing
    /// metric, type mismatch). The owning rule is skipped, not failed.
    #[error("condition error: {reason}")]
    ConditionError {
        /// The reason the condition could not be evaluated.
        reason: String,
    },
}

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;
