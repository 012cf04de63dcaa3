//! Error types for the API server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur in the API server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// Resource not found.
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error. The detail is only shown in development mode.
    #[error("internal error: {detail}")]
    Internal {
        /// What actually went wrong.
        detail: String,
        /// Whether to expose the detail in the response body.
        dev_mode: bool,
    },
}

impl ApiError {
    /// Creates an internal error honoring the development-mode flag.
    #[must_use]
    pub fn internal(detail: impl Into<String>, dev_mode: bool) -> Self {
        Self::Internal {
            detail: detail.into(),
            dev_mode,
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Self::NotFound(_, _) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            Self::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request", self.to_string())
            }
            Self::Internal { detail, dev_mode } => {
                let message = if *dev_mode {
                    detail.clone()
                } else {
                    "internal error".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
            Self::BindFailed(_, _) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error".to_string(),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}
