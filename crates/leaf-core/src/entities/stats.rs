use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Aggregate statistics for one user, derived from the session history.
///
/// Never persisted; recomputed on demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
    pub total_seconds_read: u64,
    pub total_minutes_read: u64,
    pub total_pages_read: u64,
    pub total_sessions: u64,
    /// Mean completed-session duration in seconds.
    pub average_session_duration: u64,
    /// Distinct books across all sessions, open or closed.
    pub books_started: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_read_date: Option<NaiveDate>,
}

/// Totals for the current calendar day (daily-goal progress).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub date: NaiveDate,
    pub sessions: u64,
    pub total_seconds: u64,
    pub total_minutes: u64,
}

/// Totals for one calendar day in a history chart.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub sessions: u64,
    pub total_seconds: u64,
    pub pages_read: u64,
}
