//! Error types for hh-api
//!
//! Every failure leaves the service with the same body shape:
//! `{"error": {"code": "...", "message": "..."}}`. Validation failures add a
//! `fields` map of per-field messages.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Field name to list of problems with that field
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Request body failed validation (400)
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    /// Missing or rejected credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but acting on someone else's data (403)
    #[error("{0}")]
    Forbidden(String),

    /// Conflict (409), e.g. email already taken
    #[error("{0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// hh-common error
    #[error("Common error: {0}")]
    Common(#[from] hh_common::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        ApiError::Validation { message, fields }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, fields) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Validation { message, fields } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                message,
                Some(fields),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            ApiError::Common(hh_common::Error::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None)
            }
            ApiError::Common(hh_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None)
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                internal()
            }
            ApiError::Database(ref err) => {
                error!("Database error: {}", err);
                internal()
            }
            ApiError::Common(ref err) => {
                error!("Common error: {}", err);
                internal()
            }
            ApiError::Other(ref err) => {
                error!("Unhandled error: {:#}", err);
                internal()
            }
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });
        if let Some(fields) = fields {
            body["error"]["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String, Option<FieldErrors>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Server error".to_string(),
        None,
    )
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
