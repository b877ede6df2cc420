//! Error types for the catalog service
//!
//! Every handler returns [`AppError`] so failures render the same way:
//! a JSON `{"error": ...}` body with a status derived from the variant.
//! Client mistakes (missing or malformed query parameters) map to 400,
//! storage failures propagate unrecovered and map to 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Main error type for catalog operations
#[derive(Error, Debug)]
pub enum AppError {
    /// Object store listing or metadata call failed
    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),

    /// A required query parameter was absent or empty
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// A source identifier without a tenant segment
    #[error("Malformed source identifier: {0:?} (expected <tenant>_<device>)")]
    MalformedIdentifier(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_) | AppError::MalformedIdentifier(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Storage(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
