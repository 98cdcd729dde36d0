//! Shared domain types for the tempo history sync engine.
//!
//! - `HistoryRecord` / `TimerMode`: completed timed sessions and their
//!   category, the unit everything else moves around
//! - `PendingOperation`: a remote mutation awaiting acknowledgment
//! - `SyncStatus` / `HistoryEvent`: state surfaced to the UI layer

mod record;
mod sync;

pub use record::{HistoryRecord, TimerMode};
pub use sync::{HistoryChange, HistoryEvent, PendingAction, PendingOperation, SyncStatus};
