//! Sync engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the history sync engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL for the tempo API (e.g., "https://api.tempo.app").
    pub api_base_url: String,

    /// Per-mode retention cap for the local cache, most-recent first.
    pub max_history_per_mode: usize,

    /// Batch size for migration inserts.
    pub migration_batch_size: usize,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.tempo.app".to_string(),
            max_history_per_mode: 100,
            migration_batch_size: 50,
            request_timeout_secs: 30,
        }
    }
}

impl SyncConfig {
    /// Creates a config pointing at a local test server.
    pub fn test(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            max_history_per_mode: 100,
            migration_batch_size: 50,
            request_timeout_secs: 5,
        }
    }
}
