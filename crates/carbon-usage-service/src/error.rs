//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use carbon_usage_core::ValidationErrors;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid input, with per-field messages.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Referential integrity violation (dangling foreign key).
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Bad request - undecodable body or parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "invalid input".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            Self::Integrity(msg) => (
                StatusCode::BAD_REQUEST,
                "integrity_error",
                msg.clone(),
                None,
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<carbon_usage_store::StoreError> for ApiError {
    fn from(err: carbon_usage_store::StoreError) -> Self {
        match err {
            carbon_usage_store::StoreError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} not found: {id}"))
            }
            carbon_usage_store::StoreError::ForeignKey => Self::Integrity(err.to_string()),
            carbon_usage_store::StoreError::Database(msg)
            | carbon_usage_store::StoreError::Serialization(msg)
            | carbon_usage_store::StoreError::Migration(msg) => Self::Internal(msg),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
