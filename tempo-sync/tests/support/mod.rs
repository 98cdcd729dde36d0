//! In-memory `RecordStore` used by service and migration tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tempo_sync::error::{SyncError, SyncResult};
use tempo_sync::remote::{RecordStore, RemoteRecord};
use tempo_types::TimerMode;

/// Pipes engine logs into the test harness. Safe to call from every
/// test; only the first call installs the subscriber.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tempo_sync=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Table-like in-memory store. Rows keep insertion order, so
/// `fetch_mode` can serve newest-first by reversing it.
#[derive(Default)]
pub struct MemoryRecordStore {
    rows: Mutex<Vec<RemoteRecord>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every write (insert/upsert/delete) fails with a
    /// simulated network error. Reads still work.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// When set, fetches fail with a simulated network error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Total number of remote calls of any kind.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `insert_batch` calls (migration batching).
    pub fn batch_call_count(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<RemoteRecord> {
        self.rows.lock().unwrap().clone()
    }

    pub fn rows_for_id(&self, local_id: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.local_id == local_id)
            .count()
    }

    pub fn seed(&self, row: RemoteRecord) {
        self.rows.lock().unwrap().push(row);
    }

    fn check_writable(&self) -> SyncResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(SyncError::Api("simulated network failure".into()))
        } else {
            Ok(())
        }
    }

    fn check_readable(&self) -> SyncResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(SyncError::Api("simulated network failure".into()))
        } else {
            Ok(())
        }
    }

    fn track(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, row: &RemoteRecord) -> SyncResult<()> {
        self.track();
        self.check_writable()?;
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }

    async fn upsert(&self, row: &RemoteRecord) -> SyncResult<()> {
        self.track();
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| !(r.user_id == row.user_id && r.local_id == row.local_id));
        rows.push(row.clone());
        Ok(())
    }

    async fn insert_batch(&self, rows: &[RemoteRecord]) -> SyncResult<()> {
        self.track();
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        self.rows.lock().unwrap().extend(rows.iter().cloned());
        Ok(())
    }

    async fn delete(&self, user_id: &str, local_id: &str) -> SyncResult<()> {
        self.track();
        self.check_writable()?;
        self.rows
            .lock()
            .unwrap()
            .retain(|r| !(r.user_id == user_id && r.local_id == local_id));
        Ok(())
    }

    async fn delete_in_mode(
        &self,
        user_id: &str,
        mode: TimerMode,
        local_id: &str,
    ) -> SyncResult<()> {
        self.track();
        self.check_writable()?;
        self.rows.lock().unwrap().retain(|r| {
            !(r.user_id == user_id && r.mode == mode && r.local_id == local_id)
        });
        Ok(())
    }

    async fn delete_mode(&self, user_id: &str, mode: TimerMode) -> SyncResult<()> {
        self.track();
        self.check_writable()?;
        self.rows
            .lock()
            .unwrap()
            .retain(|r| !(r.user_id == user_id && r.mode == mode));
        Ok(())
    }

    async fn fetch_mode(&self, user_id: &str, mode: TimerMode) -> SyncResult<Vec<RemoteRecord>> {
        self.track();
        self.check_readable()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.user_id == user_id && r.mode == mode)
            .rev()
            .cloned()
            .collect())
    }

    async fn fetch_ids(&self, user_id: &str, mode: TimerMode) -> SyncResult<Vec<String>> {
        self.track();
        self.check_readable()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.user_id == user_id && r.mode == mode)
            .map(|r| r.local_id.clone())
            .collect())
    }
}
