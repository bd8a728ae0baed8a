//! API error type and JSON error response formatting.
//!
//! Maps the core error taxonomy onto HTTP status codes with a consistent
//! JSON body shape across all endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core::Error;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing credentials or an invalid image payload.
    BadRequest(String),
    /// 404 Not Found - unknown session id.
    NotFound(String),
    /// 500 Internal Server Error - orchestration or collaborator failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Configuration(msg) => {
                ApiError::BadRequest(format!("configuration error: {}", msg))
            }
            Error::InvalidImage(msg) => {
                ApiError::BadRequest(format!("invalid image payload: {}", msg))
            }
            Error::NotFound(id) => ApiError::NotFound(format!("session not found: {}", id)),
            Error::Processing(cause) => {
                ApiError::Internal(format!("processing error: {:#}", cause))
            }
        }
    }
}
