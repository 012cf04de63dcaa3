//! Error types for the vigil-notify crate.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No channel is registered under the given name.
    #[error("channel not found: {name}")]
    ChannelNotFound {
        /// The channel name that was not found.
        name: String,
    },

    /// The channel exists but is disabled.
    #[error("channel disabled: {name}")]
    ChannelDisabled {
        /// The disabled channel name.
        name: String,
    },

    /// Delivery through a channel failed.
    #[error("delivery failed on '{channel}': {reason}")]
    DeliveryFailed {
        /// The channel that failed.
        channel: String,
        /// The failure reason.
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Result type for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
