use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One contiguous interval of reading for one user and one book.
///
/// Open while `end_time` is `None`; immutable once closed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Elapsed reading time in seconds. Zero while open.
    pub duration: u64,
    pub start_page: u32,
    pub end_page: u32,
    pub pages_read: u32,
    /// Local calendar day the session started on.
    pub date: NaiveDate,
}

impl ReadingSession {
    /// A freshly started session: no end time, zero duration, `end_page == start_page`.
    #[must_use]
    pub fn open(
        id: String,
        user_id: &str,
        book_id: &str,
        start_page: u32,
        start_time: DateTime<Utc>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            start_time,
            end_time: None,
            duration: 0,
            start_page,
            end_page: start_page,
            pages_read: 0,
            date,
        }
    }

    /// Whether the session has been closed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Close the session, fixing its end time, end page, and duration.
    pub fn close(&mut self, end_time: DateTime<Utc>, end_page: u32, duration: u64) {
        self.end_time = Some(end_time);
        self.end_page = end_page;
        self.pages_read = pages_between(self.start_page, end_page);
        self.duration = duration;
    }

    /// The instant the session was last touched: end time, or start time while open.
    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }
}

/// Pages read between two page numbers. Going backwards counts as zero.
#[must_use]
pub const fn pages_between(start_page: u32, end_page: u32) -> u32 {
    end_page.saturating_sub(start_page)
}
