//! Remote record store: trait seam plus the HTTP implementation.
//!
//! The remote side is a table-like resource keyed by
//! `(user_id, local_id)`. The engine only ever needs insert, upsert,
//! filtered deletes, and filtered selects; everything else (auth
//! backend, row storage) lives behind the control plane API.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tempo_types::TimerMode;
use tokio::sync::RwLock;
use tracing::debug;

/// The remote row shape. Optional attributes absent in the in-memory
/// record serialize as explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub user_id: String,
    pub local_id: String,
    pub mode: TimerMode,
    pub duration_secs: u64,
    /// RFC 3339, millisecond precision.
    pub completed_at: String,
    pub laps: Option<u32>,
    pub intervals: Option<u32>,
    pub target_secs: Option<u64>,
    pub label: Option<String>,
}

/// Abstract record store reachable over a network.
///
/// Deletes are idempotent: removing an already-absent row succeeds.
/// `upsert` replaces on conflict of `(user_id, local_id)`, which is
/// what makes at-least-once replay of the pending queue safe.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Plain insert of one row.
    async fn insert(&self, row: &RemoteRecord) -> SyncResult<()>;

    /// Insert-or-replace keyed by `(user_id, local_id)`.
    async fn upsert(&self, row: &RemoteRecord) -> SyncResult<()>;

    /// Bulk insert (migration batches).
    async fn insert_batch(&self, rows: &[RemoteRecord]) -> SyncResult<()>;

    /// Delete one row by `(user_id, local_id)`.
    async fn delete(&self, user_id: &str, local_id: &str) -> SyncResult<()>;

    /// Delete one row by `(user_id, mode, local_id)`.
    async fn delete_in_mode(
        &self,
        user_id: &str,
        mode: TimerMode,
        local_id: &str,
    ) -> SyncResult<()>;

    /// Delete every row for `(user_id, mode)`.
    async fn delete_mode(&self, user_id: &str, mode: TimerMode) -> SyncResult<()>;

    /// All rows for `(user_id, mode)`, newest-first by creation order.
    async fn fetch_mode(&self, user_id: &str, mode: TimerMode) -> SyncResult<Vec<RemoteRecord>>;

    /// Just the `local_id`s for `(user_id, mode)` (migration dedup).
    async fn fetch_ids(&self, user_id: &str, mode: TimerMode) -> SyncResult<Vec<String>>;
}

/// HTTP client for the tempo history API.
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpRecordStore {
    pub fn new(config: &SyncConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: config.api_base_url.clone(),
            token: RwLock::new(None),
        }
    }

    /// Sets the bearer token attached to every request (for restoring a
    /// saved session). `None` clears it.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    async fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn post_json(&self, path: &str, body: &impl Serialize) -> SyncResult<()> {
        let url = format!("{}{}", self.base_url, path);
        let req = self.apply_auth(self.client.post(&url).json(body)).await;
        req.send()
            .await?
            .error_for_status()
            .map_err(|e| SyncError::Api(e.to_string()))?;
        Ok(())
    }

    /// DELETE that treats 404 as success, since deleting an absent
    /// row is not an error.
    async fn delete_idempotent(&self, path_and_query: &str) -> SyncResult<()> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let req = self.apply_auth(self.client.delete(&url)).await;
        let resp = req.send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("delete of absent row at {path_and_query}, treating as success");
            return Ok(());
        }
        resp.error_for_status()
            .map_err(|e| SyncError::Api(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn insert(&self, row: &RemoteRecord) -> SyncResult<()> {
        self.post_json("/api/history", row).await
    }

    async fn upsert(&self, row: &RemoteRecord) -> SyncResult<()> {
        self.post_json("/api/history/upsert", row).await
    }

    async fn insert_batch(&self, rows: &[RemoteRecord]) -> SyncResult<()> {
        self.post_json("/api/history/batch", &serde_json::json!({ "records": rows }))
            .await
    }

    async fn delete(&self, user_id: &str, local_id: &str) -> SyncResult<()> {
        self.delete_idempotent(&format!("/api/history/{local_id}?user_id={user_id}"))
            .await
    }

    async fn delete_in_mode(
        &self,
        user_id: &str,
        mode: TimerMode,
        local_id: &str,
    ) -> SyncResult<()> {
        self.delete_idempotent(&format!(
            "/api/history/{local_id}?user_id={user_id}&mode={mode}"
        ))
        .await
    }

    async fn delete_mode(&self, user_id: &str, mode: TimerMode) -> SyncResult<()> {
        self.delete_idempotent(&format!("/api/history?user_id={user_id}&mode={mode}"))
            .await
    }

    async fn fetch_mode(&self, user_id: &str, mode: TimerMode) -> SyncResult<Vec<RemoteRecord>> {
        let url = format!(
            "{}/api/history?user_id={user_id}&mode={mode}&order=created_desc",
            self.base_url
        );
        let req = self.apply_auth(self.client.get(&url)).await;
        let resp = req
            .send()
            .await?
            .error_for_status()
            .map_err(|e| SyncError::Api(e.to_string()))?;

        #[derive(Deserialize)]
        struct Resp {
            records: Vec<RemoteRecord>,
        }
        let data: Resp = resp.json().await?;
        Ok(data.records)
    }

    async fn fetch_ids(&self, user_id: &str, mode: TimerMode) -> SyncResult<Vec<String>> {
        let url = format!(
            "{}/api/history/ids?user_id={user_id}&mode={mode}",
            self.base_url
        );
        let req = self.apply_auth(self.client.get(&url)).await;
        let resp = req
            .send()
            .await?
            .error_for_status()
            .map_err(|e| SyncError::Api(e.to_string()))?;

        #[derive(Deserialize)]
        struct Resp {
            ids: Vec<String>,
        }
        let data: Resp = resp.json().await?;
        Ok(data.ids)
    }
}
