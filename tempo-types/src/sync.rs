//! Sync queue entries and UI-facing status/event types.

use crate::record::{HistoryRecord, TimerMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of remote mutation a queue entry replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingAction {
    Insert,
    Delete,
}

impl fmt::Display for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingAction::Insert => write!(f, "insert"),
            PendingAction::Delete => write!(f, "delete"),
        }
    }
}

/// A remote mutation awaiting acknowledgment.
///
/// Appended when a remote call fails while logged in, removed on
/// confirmed remote success. Replay is idempotent,
/// so a duplicate entry is tolerated, but the queue keeps at most one
/// entry per `(id, action)` pair in steady state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Target record id. For inserts this equals `record.id`.
    pub id: String,
    pub action: PendingAction,
    /// Full payload, present only for inserts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<HistoryRecord>,
    pub enqueued_at: DateTime<Utc>,
}

impl PendingOperation {
    pub fn insert(record: HistoryRecord) -> Self {
        Self {
            id: record.id.clone(),
            action: PendingAction::Insert,
            record: Some(record),
            enqueued_at: Utc::now(),
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: PendingAction::Delete,
            record: None,
            enqueued_at: Utc::now(),
        }
    }
}

/// Sync state reported to the UI. Derived, except `last_sync_time`
/// which the engine persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub last_sync_time: Option<DateTime<Utc>>,
    /// Current pending queue length.
    pub pending_changes: usize,
    pub error: Option<String>,
}

/// A mutation of one mode's local history collection.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEvent {
    pub mode: TimerMode,
    pub change: HistoryChange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryChange {
    Saved(HistoryRecord),
    Deleted { id: String },
    Cleared,
}
