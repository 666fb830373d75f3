//! Reading streaks over local calendar days.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use leaf_core::calendar::{is_next_day, previous_day};

/// Current and longest runs of consecutive reading days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streaks {
    /// Consecutive days ending today. Zero if nothing was read today.
    pub current: u32,
    pub longest: u32,
}

/// Compute streaks from the dates of completed sessions.
///
/// Several sessions on one day count once.
#[must_use]
pub fn compute_streaks(dates: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> Streaks {
    let days: BTreeSet<NaiveDate> = dates.into_iter().collect();
    Streaks {
        current: current_streak(&days, today),
        longest: longest_streak(&days),
    }
}

fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = Some(today);
    while let Some(day) = cursor.filter(|day| days.contains(day)) {
        streak += 1;
        cursor = previous_day(day);
    }
    streak
}

fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for &day in days {
        run = match prev {
            Some(p) if is_next_day(p, day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}
