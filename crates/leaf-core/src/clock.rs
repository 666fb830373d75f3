//! Wall-clock abstraction.
//!
//! Everything that needs "now" or "today" goes through a [`Clock`] so the
//! timer's reconciliation and the calendar-day statistics can be tested with a
//! [`ManualClock`] instead of the system time.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, TimeDelta, Utc};

use crate::calendar;

/// Source of the current instant and the local UTC offset used for calendar days.
pub trait Clock: Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Offset used to map instants onto local calendar days.
    fn offset(&self) -> FixedOffset;

    /// Local calendar date of [`Clock::now`].
    fn today(&self) -> NaiveDate {
        calendar::local_date(self.now(), self.offset())
    }
}

/// System time with the machine's current local offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        *Local::now().offset()
    }
}

/// A clock that only moves when told to.
///
/// Clone-friendly (cloning shares the same underlying instant), so a test can
/// keep one handle and hand another to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Create a clock frozen at `now`, using UTC for calendar days.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    /// Create a clock frozen at `now` with an explicit local offset.
    #[must_use]
    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
            offset,
        }
    }

    /// Move the clock to an absolute instant (may go backwards).
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move the clock forward (or backward, for negative deltas).
    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(TimeDelta::seconds(45));
        assert_eq!(clock.now(), start + TimeDelta::seconds(45));
    }

    #[test]
    fn clones_share_time() {
        let start = Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();
        handle.advance(TimeDelta::minutes(5));
        assert_eq!(clock.now(), start + TimeDelta::minutes(5));
    }

    #[test]
    fn today_uses_offset() {
        // 23:30 UTC on Jan 3 is already Jan 4 at UTC+2.
        let instant = Utc.with_ymd_and_hms(2024, 1, 3, 23, 30, 0).unwrap();
        let utc = ManualClock::new(instant);
        let plus_two = ManualClock::with_offset(instant, FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(utc.today(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(plus_two.today(), NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }
}
