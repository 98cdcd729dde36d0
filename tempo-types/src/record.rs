//! History records and timer modes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timer category a history record belongs to.
///
/// Used as the partition key for local storage and as the filter for
/// remote queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Stopwatch,
    Countdown,
    Interval,
    Pomodoro,
}

impl TimerMode {
    /// All modes, in a fixed order. Migration and cache maintenance
    /// iterate over this.
    pub const ALL: [TimerMode; 4] = [
        TimerMode::Stopwatch,
        TimerMode::Countdown,
        TimerMode::Interval,
        TimerMode::Pomodoro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Stopwatch => "stopwatch",
            TimerMode::Countdown => "countdown",
            TimerMode::Interval => "interval",
            TimerMode::Pomodoro => "pomodoro",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed timed session.
///
/// The `id` is client-generated and stable for the record's lifetime;
/// it doubles as the idempotency key for remote upserts. Records are
/// never mutated in place: they are created, then either deleted
/// individually or cleared in bulk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub mode: TimerMode,
    /// Seconds elapsed. Callers validate `> 0` before saving; the
    /// engine carries the value as-is.
    pub duration_secs: u64,
    pub completed_at: DateTime<Utc>,
    /// Mode-specific attributes, carried opaquely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl HistoryRecord {
    /// Creates a record with a fresh id, completed now.
    pub fn new(mode: TimerMode, duration_secs: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mode,
            duration_secs,
            completed_at: Utc::now(),
            laps: None,
            intervals: None,
            target_secs: None,
            label: None,
        }
    }

    pub fn with_laps(mut self, laps: u32) -> Self {
        self.laps = Some(laps);
        self
    }

    pub fn with_intervals(mut self, intervals: u32) -> Self {
        self.intervals = Some(intervals);
        self
    }

    pub fn with_target_secs(mut self, target_secs: u64) -> Self {
        self.target_secs = Some(target_secs);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
