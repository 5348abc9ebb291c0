//! Error types for agritrack-ui

use agritrack_common::view::EntryFailure;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::playback::PlaybackError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Record input broke the entry constraints (400)
    #[error("{0}")]
    Validation(String),

    /// AI service answered but the text could not be used (422)
    #[error("{0}")]
    Uninterpretable(String),

    /// AI service missing, misconfigured or unreachable (502)
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Music playback command failed
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<agritrack_common::Error> for ApiError {
    fn from(err: agritrack_common::Error) -> Self {
        use agritrack_common::Error;
        match err {
            Error::Validation(msg) => ApiError::Validation(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<EntryFailure> for ApiError {
    fn from(failure: EntryFailure) -> Self {
        let message = failure.message();
        match failure {
            EntryFailure::ServiceUnavailable => ApiError::ServiceUnavailable(message),
            EntryFailure::Uninterpretable => ApiError::Uninterpretable(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::Uninterpretable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNINTERPRETABLE", msg)
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::BAD_GATEWAY, "SERVICE_UNAVAILABLE", msg)
            }
            ApiError::Playback(ref err) => {
                let status = match err {
                    PlaybackError::MissingClientId => StatusCode::BAD_REQUEST,
                    PlaybackError::NotConnected => StatusCode::CONFLICT,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, "PLAYBACK_ERROR", err.to_string())
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
