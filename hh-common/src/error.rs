//! Common error types for Hobby Helper

use thiserror::Error;

/// Common result type for Hobby Helper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the API service and the seed tool
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON column or seed file could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Password hashing or token signing failure
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
