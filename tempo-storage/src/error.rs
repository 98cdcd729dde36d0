//! Storage error types.
//!
//! Only `LocalStore::open` is fallible; the read/write paths absorb
//! failures and degrade to defaults instead.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur opening the local store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
