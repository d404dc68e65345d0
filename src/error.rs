//! Error types for tunedex
//!
//! Every error that reaches a client is serialized as a JSON body of the
//! form `{"message": ...}` with the matching HTTP status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client does not accept the response format (406)
    #[error("Not acceptable: {0}")]
    NotAcceptable(String),

    /// Request body has the wrong content type (415)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Request body failed validation (422)
    #[error("Unprocessable entity: {0}")]
    Validation(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotAcceptable(msg) => (StatusCode::NOT_ACCEPTABLE, msg),
            ApiError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Database(ref err) => {
                tracing::error!(error = %err, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Io(ref err) => {
                tracing::error!(error = %err, "IO error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Other(ref err) => {
                tracing::error!(error = %err, "Unexpected error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
