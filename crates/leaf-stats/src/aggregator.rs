//! Statistics over a user's session history.
//!
//! Everything is recomputed from the stored history on demand; nothing here
//! is cached or persisted. Only completed sessions count toward totals.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use leaf_core::calendar::trailing_days;
use leaf_core::clock::Clock;
use leaf_core::entities::{DailyTotal, ReadingSession, ReadingStats, TodayStats};
use leaf_store::SessionRepository;

use crate::streak::compute_streaks;

/// Whole minutes in `seconds`, rounded half up.
#[must_use]
pub const fn rounded_minutes(seconds: u64) -> u64 {
    seconds.saturating_add(30) / 60
}

/// Computes [`ReadingStats`], [`TodayStats`], and [`DailyTotal`]s.
pub struct StatsAggregator<R, C> {
    repo: Arc<R>,
    clock: C,
}

impl<R: SessionRepository, C: Clock> StatsAggregator<R, C> {
    pub const fn new(repo: Arc<R>, clock: C) -> Self {
        Self { repo, clock }
    }

    fn user_sessions(&self, user_id: &str) -> Vec<ReadingSession> {
        self.repo
            .read_all()
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .collect()
    }

    /// Lifetime statistics for `user_id`. All zero for a user with no history.
    #[must_use]
    pub fn get_user_stats(&self, user_id: &str) -> ReadingStats {
        let sessions = self.user_sessions(user_id);
        let books_started = sessions
            .iter()
            .map(|s| s.book_id.as_str())
            .collect::<HashSet<_>>()
            .len() as u64;

        let completed: Vec<&ReadingSession> =
            sessions.iter().filter(|s| s.is_completed()).collect();
        let total_sessions = completed.len() as u64;
        let total_seconds_read: u64 = completed.iter().map(|s| s.duration).sum();
        let total_pages_read: u64 = completed.iter().map(|s| u64::from(s.pages_read)).sum();
        let average_session_duration = total_seconds_read
            .checked_div(total_sessions)
            .unwrap_or(0);

        let streaks = compute_streaks(completed.iter().map(|s| s.date), self.clock.today());
        let last_read_date = completed
            .iter()
            .max_by_key(|s| s.last_activity())
            .map(|s| s.date);

        tracing::debug!(
            user = user_id,
            sessions = total_sessions,
            seconds = total_seconds_read,
            "user stats computed"
        );

        ReadingStats {
            total_seconds_read,
            total_minutes_read: rounded_minutes(total_seconds_read),
            total_pages_read,
            total_sessions,
            average_session_duration,
            books_started,
            current_streak: streaks.current,
            longest_streak: streaks.longest,
            last_read_date,
        }
    }

    /// Completed sessions that started on the current local calendar day.
    #[must_use]
    pub fn get_today_stats(&self, user_id: &str) -> TodayStats {
        let today = self.clock.today();
        let (sessions, total_seconds) = self
            .user_sessions(user_id)
            .iter()
            .filter(|s| s.is_completed() && s.date == today)
            .fold((0, 0), |(count, secs), s| (count + 1, secs + s.duration));

        TodayStats {
            date: today,
            sessions,
            total_seconds,
            total_minutes: rounded_minutes(total_seconds),
        }
    }

    /// Per-day totals for the last `days` calendar days ending today, oldest
    /// first. Days without reading are present with zeros.
    #[must_use]
    pub fn daily_totals(&self, user_id: &str, days: u32) -> Vec<DailyTotal> {
        let mut totals: BTreeMap<_, _> = trailing_days(self.clock.today(), days)
            .into_iter()
            .map(|date| {
                (
                    date,
                    DailyTotal {
                        date,
                        sessions: 0,
                        total_seconds: 0,
                        pages_read: 0,
                    },
                )
            })
            .collect();

        for session in self.user_sessions(user_id) {
            if !session.is_completed() {
                continue;
            }
            if let Some(total) = totals.get_mut(&session.date) {
                total.sessions += 1;
                total.total_seconds += session.duration;
                total.pages_read += u64::from(session.pages_read);
            }
        }

        totals.into_values().collect()
    }
}
