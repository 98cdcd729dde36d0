//! Sync error types.
//!
//! These stay internal to the engine: the public `SyncService` API
//! absorbs every failure (queueing it, logging it, or falling back to
//! the local cache) and surfaces problems only through `SyncStatus`.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur talking to the remote record store.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("authentication required")]
    AuthRequired,

    #[error("invalid timestamp: {0}")]
    Timestamp(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
