//! `ReadingTracker`: the operations the UI layer consumes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use leaf_config::{LeafConfig, TimerConfig};
use leaf_core::clock::{Clock, SystemClock};
use leaf_core::entities::{DailyTotal, ReadingSession, ReadingStats, TodayStats};
use leaf_store::{
    FileSessionRepository, FileStore, JsonSessionRepository, MemorySessionRepository,
    MemoryStore, SessionLifecycle, SessionRepository,
};
use leaf_stats::StatsAggregator;
use leaf_timer::{ReadingTimer, StopOutcome, TimerView};

use crate::error::TrackerError;

/// Reading-session tracker for any number of users.
///
/// Each user gets one [`ReadingTimer`], created on first use and restored
/// from that user's snapshot. Timer operations spawn Tokio tasks, so they must
/// run inside a Tokio runtime.
pub struct ReadingTracker<R, C> {
    lifecycle: Arc<SessionLifecycle<R, C>>,
    stats: StatsAggregator<R, C>,
    timer_config: TimerConfig,
    daily_totals_days: u32,
    timers: Mutex<HashMap<String, ReadingTimer<R, C>>>,
}

impl ReadingTracker<FileSessionRepository, SystemClock> {
    /// Tracker over the configured data directory, using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` if no data directory can be resolved, or
    /// `TrackerError::Store` if it cannot be created.
    pub fn open(config: &LeafConfig) -> Result<Self, TrackerError> {
        let dir = config.storage.resolve_data_dir()?;
        let store = FileStore::open(&dir)?;
        tracing::debug!(dir = %dir.display(), "opened session store");
        let repo = JsonSessionRepository::with_config(store, &config.storage);
        Ok(Self::new(Arc::new(repo), SystemClock, config))
    }
}

impl<C: Clock + Clone> ReadingTracker<MemorySessionRepository, C> {
    /// Tracker whose history lives only in memory.
    #[must_use]
    pub fn in_memory(clock: C, config: &LeafConfig) -> Self {
        let repo = JsonSessionRepository::with_config(MemoryStore::new(), &config.storage);
        Self::new(Arc::new(repo), clock, config)
    }
}

impl<R: SessionRepository, C: Clock + Clone> ReadingTracker<R, C> {
    #[must_use]
    pub fn new(repo: Arc<R>, clock: C, config: &LeafConfig) -> Self {
        Self {
            lifecycle: Arc::new(SessionLifecycle::new(Arc::clone(&repo), clock.clone())),
            stats: StatsAggregator::new(repo, clock),
            timer_config: config.timer.clone(),
            daily_totals_days: config.general.daily_totals_days,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// The user's timer, restoring it from its snapshot on first use.
    fn timer(&self, user_id: &str) -> ReadingTimer<R, C> {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        timers
            .entry(user_id.to_string())
            .or_insert_with(|| {
                let timer = ReadingTimer::new(
                    user_id,
                    Arc::clone(&self.lifecycle),
                    self.timer_config.clone(),
                );
                timer.restore();
                timer
            })
            .clone()
    }

    fn loaded_timers(&self) -> Vec<ReadingTimer<R, C>> {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    // -- Timer ---------------------------------------------------------------

    /// Start reading `book_id` from `start_page`. Returns the new session id.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Timer` if a session is already running or
    /// paused, or if the session record cannot be created.
    pub fn start_session(
        &self,
        user_id: &str,
        book_id: &str,
        start_page: u32,
    ) -> Result<String, TrackerError> {
        Ok(self.timer(user_id).start(book_id, start_page)?)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Timer` unless the user's timer is running.
    pub fn pause_session(&self, user_id: &str) -> Result<(), TrackerError> {
        Ok(self.timer(user_id).pause()?)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Timer` unless the user's timer is paused.
    pub fn resume_session(&self, user_id: &str) -> Result<(), TrackerError> {
        Ok(self.timer(user_id).resume()?)
    }

    /// Stop the user's session at `end_page` and record it.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Timer` if no session is running or paused.
    pub fn stop_session(&self, user_id: &str, end_page: u32) -> Result<StopOutcome, TrackerError> {
        Ok(self.timer(user_id).stop(end_page)?)
    }

    /// Throw away the user's running or paused session.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Timer` if no session is running or paused.
    pub fn discard_session(&self, user_id: &str) -> Result<(), TrackerError> {
        Ok(self.timer(user_id).discard()?)
    }

    /// Checkpoint every loaded timer before the process is suspended.
    pub fn on_suspend(&self) {
        for timer in self.loaded_timers() {
            timer.on_suspend();
        }
    }

    /// Reconcile every loaded timer after the process resumes.
    pub fn on_resume(&self) {
        for timer in self.loaded_timers() {
            timer.on_resume();
        }
    }

    #[must_use]
    pub fn timer_view(&self, user_id: &str) -> TimerView {
        self.timer(user_id).view()
    }

    // -- Statistics ----------------------------------------------------------

    #[must_use]
    pub fn get_user_stats(&self, user_id: &str) -> ReadingStats {
        self.stats.get_user_stats(user_id)
    }

    #[must_use]
    pub fn get_today_stats(&self, user_id: &str) -> TodayStats {
        self.stats.get_today_stats(user_id)
    }

    /// Per-day totals for the last `days` days, oldest first.
    #[must_use]
    pub fn daily_totals(&self, user_id: &str, days: u32) -> Vec<DailyTotal> {
        self.stats.daily_totals(user_id, days)
    }

    /// Per-day totals over the configured default window.
    #[must_use]
    pub fn recent_daily_totals(&self, user_id: &str) -> Vec<DailyTotal> {
        self.daily_totals(user_id, self.daily_totals_days)
    }

    // -- History -------------------------------------------------------------

    #[must_use]
    pub fn get_user_sessions(&self, user_id: &str) -> Vec<ReadingSession> {
        self.lifecycle.get_user_sessions(user_id)
    }

    #[must_use]
    pub fn get_book_sessions(&self, user_id: &str, book_id: &str) -> Vec<ReadingSession> {
        self.lifecycle.get_book_sessions(user_id, book_id)
    }
}
