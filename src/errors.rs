//! # Error Handling
//!
//! Crate-wide error types for the Gatehouse service, built with `thiserror`.
//! Authentication-boundary errors live in [`crate::auth::models::AuthError`];
//! this module covers everything underneath them (storage, config, hashing).

/// Custom result type for Gatehouse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Gatehouse service
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// A store call exceeded its bounded deadline
    #[error("Operation timed out: {operation} after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID '{id}'")]
    NotFound { resource_type: String, id: String },

    /// Credential hashing failures (resource exhaustion in Argon2)
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    /// Create a hashing error
    pub fn hashing<S: Into<String>>(message: S) -> Self {
        Self::Hashing(message.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Create a timeout error for a named store operation
    pub fn timeout<S: Into<String>>(operation: S, duration: std::time::Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration_ms: duration.as_millis() as u64 }
    }

    /// Whether this error means the backing store could not be reached in
    /// time, as opposed to the store rejecting the operation. Deadline
    /// expiries and connection-class failures surface to callers as
    /// `StoreUnavailable`.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Database { source, .. } => is_connectivity_error(source),
            _ => false,
        }
    }
}

/// Connection-class SQLx failures: the single error class eligible for the
/// bounded immediate retry in [`crate::storage::guarded`].
pub fn is_connectivity_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
    )
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}
