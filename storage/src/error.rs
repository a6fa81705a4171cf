//! Storage error types.
//!
//! Used by repository implementations and callers of storage APIs.

use relay_core::RelayError;
use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for RelayError {
    fn from(e: StorageError) -> Self {
        RelayError::Database(e.to_string())
    }
}
