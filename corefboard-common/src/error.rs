//! Common error types for corefboard

use thiserror::Error;

/// Common result type for corefboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the corefboard crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors the fallback store is allowed to absorb.
    ///
    /// Validation rejections and not-found results are answers, not
    /// backing-store failures, and must surface to the caller unchanged.
    pub fn is_backing_store_failure(&self) -> bool {
        matches!(self, Error::Database(_))
    }
}
