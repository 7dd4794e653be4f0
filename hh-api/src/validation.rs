//! Request body validation helpers
//!
//! Handlers collect every problem with a body before answering, so the
//! client can show all field messages at once.

use url::Url;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, FieldErrors};

/// Accumulates field errors for one request body
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field` unless `ok`
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    /// Minimum length in characters (not bytes)
    pub fn min_chars(&mut self, value: &str, min: usize, field: &str) {
        self.check(
            value.chars().count() >= min,
            field,
            format!("Must be at least {} characters", min),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok` when nothing was recorded, otherwise a validation error
    pub fn finish(self) -> ApiResult<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ApiError::Validation {
            message: "Validation failed".to_string(),
            fields: self.errors,
        })
    }
}

/// Absolute http(s) URL with a non-empty host
pub fn is_http_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Parse an id from a path segment or body field
pub fn parse_id(field: &str, value: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| ApiError::invalid_field(field, format!("Invalid id: {}", value)))
}
