//! Record codec between the in-memory record shape and the remote
//! row shape.
//!
//! Pure, bidirectional, no I/O. Timestamps cross the wire as RFC 3339
//! strings at millisecond precision; optional attributes absent in
//! memory serialize as explicit `null` on the wire and come back as
//! `None`.

use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use tempo_types::{HistoryRecord, TimerMode};

use crate::remote::RemoteRecord;

/// Converts a local record into the remote row shape for `user_id`.
///
/// The timestamp is truncated to millisecond precision, so converting
/// a record that has already round-tripped once is lossless.
pub fn to_remote(record: &HistoryRecord, user_id: &str) -> RemoteRecord {
    RemoteRecord {
        user_id: user_id.to_string(),
        local_id: record.id.clone(),
        mode: record.mode,
        duration_secs: record.duration_secs,
        completed_at: truncate_to_millis(record.completed_at)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        laps: record.laps,
        intervals: record.intervals,
        target_secs: record.target_secs,
        label: record.label.clone(),
    }
}

/// Converts a remote row back into the in-memory record shape.
pub fn from_remote(row: &RemoteRecord) -> SyncResult<HistoryRecord> {
    let completed_at = DateTime::parse_from_rfc3339(&row.completed_at)
        .map_err(|e| SyncError::Timestamp(format!("{}: {e}", row.completed_at)))?
        .with_timezone(&Utc);

    Ok(HistoryRecord {
        id: row.local_id.clone(),
        mode: row.mode,
        duration_secs: row.duration_secs,
        completed_at,
        laps: row.laps,
        intervals: row.intervals,
        target_secs: row.target_secs,
        label: row.label.clone(),
    })
}

/// Drops sub-millisecond precision so the wire format round-trips
/// exactly.
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ts.timestamp_millis())
        .single()
        .unwrap_or(ts)
}

/// Local-store cache key for one mode's history collection.
pub fn history_key(mode: TimerMode) -> String {
    format!("history.{mode}")
}
