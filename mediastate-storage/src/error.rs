//! Storage error types.

use std::sync::Arc;
use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity already exists (e.g. duplicate username on registration)
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Operation not implemented by the active backend
    #[error("Operation not supported by backend: {0}")]
    Unsupported(&'static str),

    /// Storage backend error (I/O, protocol, validation inside the backend)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend construction failed; the failure is memoized, so every
    /// caller of the same process observes the same underlying error.
    #[error("Storage initialization failed: {0}")]
    Init(#[source] Arc<StorageError>),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    /// Check if this is an "operation not supported" error, possibly
    /// wrapped by a failed initialization.
    pub fn is_unsupported(&self) -> bool {
        match self {
            StorageError::Unsupported(_) => true,
            StorageError::Init(inner) => inner.is_unsupported(),
            _ => false,
        }
    }
}
