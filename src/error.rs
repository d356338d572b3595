//! Error types for the API surface
//!
//! Provides unified error handling using thiserror.
//!
//! Store-level faults never reach this layer: every store operation fails
//! open and reports misses instead of errors. What remains here is the set
//! of faults that are surfaced to HTTP clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Api Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Store unreachable after the retry ceiling
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// Missing or malformed request fields
    #[error("{0}")]
    Validation(String),

    /// Request ceiling exceeded for a limiter scope
    #[error("{0}")]
    RateLimited(String),

    /// Uncaught handler fault
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Internal(detail) = &self {
            // Full detail goes to the log sink only; clients get the message
            tracing::error!(%detail, "internal error");
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for request handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::Connection("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::Validation("missing field".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::RateLimited("slow down".into()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ApiError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = err.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_rate_limited_message_passthrough() {
        let err = ApiError::RateLimited("Too many requests, please slow down.".into());
        assert_eq!(err.to_string(), "Too many requests, please slow down.");
    }
}
