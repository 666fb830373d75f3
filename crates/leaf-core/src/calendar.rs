//! Calendar-day arithmetic.
//!
//! Streaks and daily totals are bucketed by local calendar day, not by rolling
//! 24-hour windows. All "which day is this instant" and "is this the next day"
//! questions are answered here so timezone handling lives in one place.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::errors::CoreError;

/// Storage format for calendar dates (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Local calendar date of an instant at the given UTC offset.
#[must_use]
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// The calendar day before `date`.
#[must_use]
pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// Whether `next` is exactly one calendar day after `prev`.
#[must_use]
pub fn is_next_day(prev: NaiveDate, next: NaiveDate) -> bool {
    prev.succ_opt() == Some(next)
}

/// Longest window [`trailing_days`] will produce (about ten years).
pub const MAX_TRAILING_DAYS: u32 = 3_660;

/// The last `days` calendar days ending at `today`, oldest first.
///
/// `days` is capped at [`MAX_TRAILING_DAYS`].
#[must_use]
pub fn trailing_days(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    let days = days.min(MAX_TRAILING_DAYS);
    let mut out = Vec::with_capacity(days as usize);
    let mut cursor = Some(today);
    for _ in 0..days {
        let Some(day) = cursor else { break };
        out.push(day);
        cursor = previous_day(day);
    }
    out.reverse();
    out
}

/// Whole seconds from `from` to `to`, floored. Negative spans clamp to zero.
#[must_use]
pub fn whole_seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_seconds()).unwrap_or(0)
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the string is not a valid calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| CoreError::Validation(format!("Invalid date '{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[rstest]
    #[case("2024-01-01", "2024-01-02", true)]
    #[case("2024-01-31", "2024-02-01", true)]
    #[case("2024-02-28", "2024-02-29", true)]
    #[case("2023-12-31", "2024-01-01", true)]
    #[case("2024-01-01", "2024-01-03", false)]
    #[case("2024-01-02", "2024-01-01", false)]
    #[case("2024-01-01", "2024-01-01", false)]
    fn next_day_detection(#[case] prev: &str, #[case] next: &str, #[case] expected: bool) {
        assert_eq!(is_next_day(day(prev), day(next)), expected);
    }

    #[test]
    fn trailing_days_oldest_first() {
        let days = trailing_days(day("2024-03-01"), 3);
        assert_eq!(
            days,
            vec![day("2024-02-28"), day("2024-02-29"), day("2024-03-01")]
        );
    }

    #[test]
    fn trailing_days_zero() {
        assert!(trailing_days(day("2024-03-01"), 0).is_empty());
    }

    #[test]
    fn trailing_days_caps_huge_windows() {
        let days = trailing_days(day("2024-01-03"), u32::MAX);
        assert_eq!(days.len(), MAX_TRAILING_DAYS as usize);
        assert_eq!(days.last(), Some(&day("2024-01-03")));
    }

    #[test]
    fn local_date_respects_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(local_date(instant, minus_five), day("2023-12-31"));
    }

    #[test]
    fn whole_seconds_floor_and_clamp() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(whole_seconds_between(t, t + TimeDelta::milliseconds(45_900)), 45);
        assert_eq!(whole_seconds_between(t, t - TimeDelta::seconds(30)), 0);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn format_roundtrip() {
        assert_eq!(format_date(day("2024-01-09")), "2024-01-09");
    }
}
