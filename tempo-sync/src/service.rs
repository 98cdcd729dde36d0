//! Sync service, the stateful orchestrator.
//!
//! Owns the current user identity, the per-mode local collections, and
//! the pending queue. Every write lands in the local store first and is
//! announced to history listeners before any remote I/O is awaited, so
//! the UI reflects its own writes immediately regardless of network
//! state. A permanently unreachable remote degrades to local-only
//! operation indefinitely.

use crate::codec;
use crate::config::SyncConfig;
use crate::listeners::{ListenerSet, Subscription};
use crate::migration;
use crate::queue::PendingQueue;
use crate::remote::RecordStore;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempo_storage::LocalStore;
use tempo_types::{
    HistoryChange, HistoryEvent, HistoryRecord, PendingAction, PendingOperation, SyncStatus,
    TimerMode,
};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

const LAST_SYNC_KEY: &str = "sync.last_sync_time";

type ModeGuards = [tokio::sync::Mutex<()>; TimerMode::ALL.len()];

/// The history sync engine. Construct one per application session and
/// share it as `Arc<SyncService>`.
pub struct SyncService {
    store: LocalStore,
    remote: Arc<dyn RecordStore>,
    config: SyncConfig,
    /// `None` when logged out.
    user_id: RwLock<Option<String>>,
    /// Single global re-entrancy guard for `sync_to_cloud`.
    is_syncing: AtomicBool,
    queue: tokio::sync::Mutex<PendingQueue>,
    /// Serializes the read-modify-write on each mode's collection, so
    /// two overlapping saves on the same mode cannot drop a record.
    mode_guards: ModeGuards,
    last_error: Mutex<Option<String>>,
    status_listeners: ListenerSet<SyncStatus>,
    history_listeners: ListenerSet<HistoryEvent>,
}

impl SyncService {
    pub fn new(store: LocalStore, remote: Arc<dyn RecordStore>, config: SyncConfig) -> Self {
        let queue = PendingQueue::load(store.clone());
        Self {
            store,
            remote,
            config,
            user_id: RwLock::new(None),
            is_syncing: AtomicBool::new(false),
            queue: tokio::sync::Mutex::new(queue),
            mode_guards: Default::default(),
            last_error: Mutex::new(None),
            status_listeners: ListenerSet::new(),
            history_listeners: ListenerSet::new(),
        }
    }

    // ── Identity ──

    /// Sets or clears the remote identity. Idempotent for a repeated
    /// id. Logging in runs the one-time migration for that user, then a
    /// sync pass; logging out just stops treating the remote as
    /// available.
    pub async fn set_user(&self, user_id: Option<String>) {
        {
            let current = self.user_id.read().await;
            if *current == user_id {
                return;
            }
        }

        match user_id {
            Some(id) => {
                info!("user {id} logged in, starting migration + sync");
                *self.user_id.write().await = Some(id.clone());
                migration::run(
                    &self.store,
                    self.remote.as_ref(),
                    &id,
                    self.config.migration_batch_size,
                )
                .await;
                self.sync_to_cloud().await;
            }
            None => {
                info!("user logged out, resuming local-only mode");
                *self.user_id.write().await = None;
                self.notify_status().await;
            }
        }
    }

    pub async fn current_user(&self) -> Option<String> {
        self.user_id.read().await.clone()
    }

    // ── History CRUD ──

    /// Returns the history collection for `mode`.
    ///
    /// The local cache is the fast path and the default: every write
    /// keeps it current. With `force_remote` while logged in, the
    /// remote store is queried (newest-first), the cache overwritten
    /// with the result; a remote failure falls back to the stale cache
    /// rather than surfacing an error.
    pub async fn get_history(&self, mode: TimerMode, force_remote: bool) -> Vec<HistoryRecord> {
        let key = codec::history_key(mode);

        if force_remote {
            if let Some(user) = self.current_user().await {
                match self.remote.fetch_mode(&user, mode).await {
                    Ok(rows) => {
                        let records: Vec<HistoryRecord> = rows
                            .iter()
                            .filter_map(|row| match codec::from_remote(row) {
                                Ok(record) => Some(record),
                                Err(e) => {
                                    warn!("skipping undecodable remote row: {e}");
                                    None
                                }
                            })
                            .collect();
                        let _guard = self.mode_guard(mode).lock().await;
                        self.store.set(&key, &records);
                        return records;
                    }
                    Err(e) => {
                        warn!("remote refresh for {mode} failed, serving local cache: {e}");
                    }
                }
            }
        }

        self.store.get(&key, Vec::new())
    }

    /// Saves a completed session: prepends to the mode's local
    /// collection (truncated to the retention cap), persists, and emits
    /// a `Saved` event, all before the remote attempt, and
    /// unconditionally even when logged out. A failed remote insert is
    /// queued for replay.
    pub async fn save_record(&self, record: HistoryRecord) {
        let mode = record.mode;
        let key = codec::history_key(mode);
        {
            let _guard = self.mode_guard(mode).lock().await;
            let mut records: Vec<HistoryRecord> = self.store.get(&key, Vec::new());
            records.insert(0, record.clone());
            records.truncate(self.config.max_history_per_mode);
            self.store.set(&key, &records);
        }
        self.history_listeners.emit(&HistoryEvent {
            mode,
            change: HistoryChange::Saved(record.clone()),
        });

        if let Some(user) = self.current_user().await {
            let row = codec::to_remote(&record, &user);
            if let Err(e) = self.remote.insert(&row).await {
                warn!("remote insert of {} failed, queueing: {e}", record.id);
                self.enqueue_failed(PendingOperation::insert(record), e.to_string())
                    .await;
            }
        }
    }

    /// Deletes one record by id. Local removal and the `Deleted` event
    /// come first; a failed remote delete is queued for replay.
    pub async fn delete_record(&self, id: &str, mode: TimerMode) {
        let key = codec::history_key(mode);
        {
            let _guard = self.mode_guard(mode).lock().await;
            let mut records: Vec<HistoryRecord> = self.store.get(&key, Vec::new());
            records.retain(|record| record.id != id);
            self.store.set(&key, &records);
        }
        self.history_listeners.emit(&HistoryEvent {
            mode,
            change: HistoryChange::Deleted { id: id.to_string() },
        });

        if let Some(user) = self.current_user().await {
            if let Err(e) = self.remote.delete_in_mode(&user, mode, id).await {
                warn!("remote delete of {id} failed, queueing: {e}");
                self.enqueue_failed(PendingOperation::delete(id), e.to_string())
                    .await;
            }
        }
    }

    /// Empties one mode's collection. The remote bulk delete is
    /// best-effort and deliberately not queued for retry: a failure
    /// here is logged and reflected in the status error field only, an
    /// accepted inconsistency window.
    pub async fn clear_history(&self, mode: TimerMode) {
        let key = codec::history_key(mode);
        {
            let _guard = self.mode_guard(mode).lock().await;
            self.store.set(&key, &Vec::<HistoryRecord>::new());
        }
        self.history_listeners.emit(&HistoryEvent {
            mode,
            change: HistoryChange::Cleared,
        });

        if let Some(user) = self.current_user().await {
            if let Err(e) = self.remote.delete_mode(&user, mode).await {
                warn!("remote bulk clear of {mode} failed (not retried): {e}");
                *self.last_error.lock().unwrap() = Some(e.to_string());
                self.notify_status().await;
            }
        }
    }

    // ── Queue drain ──

    /// Replays the pending queue against the remote store, in enqueue
    /// order. No-op when logged out or when a sync is already running.
    ///
    /// Inserts replay as upserts keyed by `(user, id)`, so a record
    /// whose earlier insert succeeded but whose acknowledgment was lost
    /// is not duplicated. Deletes are naturally idempotent. Each
    /// confirmed item is removed individually; failures stay queued for
    /// the next pass.
    pub async fn sync_to_cloud(&self) {
        let user = match self.current_user().await {
            Some(user) => user,
            None => return,
        };

        if self
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync already in progress, skipping");
            return;
        }

        self.notify_status().await;

        let ops = self.queue.lock().await.snapshot();
        if !ops.is_empty() {
            debug!("replaying {} pending operations", ops.len());
        }

        let mut failed = 0usize;
        for op in ops {
            let result = match (op.action, &op.record) {
                (PendingAction::Insert, Some(record)) => {
                    self.remote.upsert(&codec::to_remote(record, &user)).await
                }
                (PendingAction::Insert, None) => {
                    warn!("pending insert for {} has no payload, dropping", op.id);
                    Ok(())
                }
                (PendingAction::Delete, _) => self.remote.delete(&user, &op.id).await,
            };

            match result {
                Ok(()) => self.queue.lock().await.remove(&op.id, op.action),
                Err(e) => {
                    warn!("replay of {} for {} failed, keeping queued: {e}", op.action, op.id);
                    *self.last_error.lock().unwrap() = Some(e.to_string());
                    failed += 1;
                }
            }
        }

        if failed == 0 {
            *self.last_error.lock().unwrap() = None;
        }

        self.store.set(LAST_SYNC_KEY, &Some(Utc::now()));
        self.is_syncing.store(false, Ordering::SeqCst);
        self.notify_status().await;
    }

    // ── Observability ──

    /// Current sync state as shown to the UI.
    pub async fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            is_syncing: self.is_syncing.load(Ordering::SeqCst),
            last_sync_time: self.store.get::<Option<DateTime<Utc>>>(LAST_SYNC_KEY, None),
            pending_changes: self.queue.lock().await.len(),
            error: self.last_error.lock().unwrap().clone(),
        }
    }

    pub fn on_sync_status_change(
        &self,
        callback: impl Fn(&SyncStatus) + Send + Sync + 'static,
    ) -> Subscription<SyncStatus> {
        self.status_listeners.subscribe(callback)
    }

    pub fn on_history_change(
        &self,
        callback: impl Fn(&HistoryEvent) + Send + Sync + 'static,
    ) -> Subscription<HistoryEvent> {
        self.history_listeners.subscribe(callback)
    }

    /// Subscribes to an online/offline signal; the transition to online
    /// triggers a sync pass. There is no periodic polling beyond this.
    pub fn watch_connectivity(
        self: &Arc<Self>,
        mut online_rx: watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut online = *online_rx.borrow();
            while online_rx.changed().await.is_ok() {
                let now_online = *online_rx.borrow();
                if now_online && !online {
                    debug!("connectivity restored, scheduling sync pass");
                    service.sync_to_cloud().await;
                }
                online = now_online;
            }
        })
    }

    // ── Internals ──

    fn mode_guard(&self, mode: TimerMode) -> &tokio::sync::Mutex<()> {
        let idx = match mode {
            TimerMode::Stopwatch => 0,
            TimerMode::Countdown => 1,
            TimerMode::Interval => 2,
            TimerMode::Pomodoro => 3,
        };
        &self.mode_guards[idx]
    }

    async fn enqueue_failed(&self, op: PendingOperation, error: String) {
        *self.last_error.lock().unwrap() = Some(error);
        self.queue.lock().await.push(op);
        self.notify_status().await;
    }

    async fn notify_status(&self) {
        let status = self.sync_status().await;
        self.status_listeners.emit(&status);
    }
}
