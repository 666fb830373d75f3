//! Per-user reading timer.
//!
//! `ReadingTimer` drives one user's open session through
//! `idle → running ⇄ paused → stopped → idle`. While running, a tick task
//! refreshes the counter and requests a debounced snapshot write. The snapshot
//! is the durable checkpoint: `on_suspend` writes it immediately, and
//! `on_resume`/`restore` rebuild the counter from it.
//!
//! The in-memory state lives behind a `std::sync::Mutex` that is never held
//! across an `.await`; the spawned tasks only hold a `Weak` back-reference, so
//! dropping the last `ReadingTimer` aborts them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use leaf_config::TimerConfig;
use leaf_core::clock::Clock;
use leaf_core::entities::{ReadingSession, TimerSnapshot};
use leaf_core::enums::TimerStatus;
use leaf_store::{EndOutcome, SessionLifecycle, SessionRepository};
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::TimerError;
use crate::reconcile::{Reconciled, reconcile};
use crate::task::ScheduledTask;

/// Read-only view of a timer for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
    pub status: TimerStatus,
    pub session_seconds: u64,
    pub session_id: Option<String>,
    pub book_id: Option<String>,
    pub start_page: u32,
}

/// Result of [`ReadingTimer::stop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The session was closed with the timer's count as its duration.
    Saved(ReadingSession),
    /// The session record was missing or could not be written. The timer
    /// reset anyway.
    NotSaved {
        session_id: Option<String>,
        session_seconds: u64,
    },
}

struct TimerState {
    status: TimerStatus,
    /// Seconds accumulated before the current running stretch.
    banked_seconds: u64,
    /// Start of the current running stretch; `None` while paused or suspended.
    running_since: Option<Instant>,
    session_id: Option<String>,
    book_id: Option<String>,
    start_page: u32,
    /// Tick-driven snapshot writes are dropped until this instant.
    quiet_until: Option<Instant>,
    tick: ScheduledTask,
    pending_write: ScheduledTask,
}

impl TimerState {
    const fn idle() -> Self {
        Self {
            status: TimerStatus::Idle,
            banked_seconds: 0,
            running_since: None,
            session_id: None,
            book_id: None,
            start_page: 0,
            quiet_until: None,
            tick: ScheduledTask::new(),
            pending_write: ScheduledTask::new(),
        }
    }

    fn session_seconds(&self, now: Instant) -> u64 {
        let stretch = self
            .running_since
            .map_or(0, |since| now.saturating_duration_since(since).as_secs());
        self.banked_seconds.saturating_add(stretch)
    }

    fn bank(&mut self, now: Instant) {
        self.banked_seconds = self.session_seconds(now);
        self.running_since = None;
    }

    fn cancel_tasks(&mut self) {
        self.tick.cancel();
        self.pending_write.cancel();
    }

    /// Back to idle. Dropping the old task handles aborts them.
    fn reset(&mut self) {
        *self = Self::idle();
    }

    fn in_quiet_window(&self, now: Instant) -> bool {
        self.quiet_until.is_some_and(|until| now < until)
    }

    fn snapshot(&self, now: Instant, wall: DateTime<Utc>) -> TimerSnapshot {
        TimerSnapshot {
            session_seconds: self.session_seconds(now),
            is_running: self.status.has_open_session(),
            is_paused: self.status == TimerStatus::Paused,
            current_session_id: self.session_id.clone(),
            start_page: self.start_page,
            selected_book_id: self.book_id.clone(),
            last_update_time: wall,
        }
    }

    fn view(&self, now: Instant) -> TimerView {
        TimerView {
            status: self.status,
            session_seconds: self.session_seconds(now),
            session_id: self.session_id.clone(),
            book_id: self.book_id.clone(),
            start_page: self.start_page,
        }
    }
}

struct Inner<R, C> {
    user_id: String,
    lifecycle: Arc<SessionLifecycle<R, C>>,
    config: TimerConfig,
    state: Mutex<TimerState>,
}

impl<R: SessionRepository, C: Clock> Inner<R, C> {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_tick(self: &Arc<Self>, state: &mut TimerState) {
        let weak = Arc::downgrade(self);
        let period = self.config.tick_interval();
        state.tick.start(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.on_tick();
            }
        });
    }

    fn on_tick(self: &Arc<Self>) {
        let mut state = self.lock();
        if state.status != TimerStatus::Running {
            return;
        }
        if state.in_quiet_window(Instant::now()) {
            tracing::trace!(user = %self.user_id, "snapshot write suppressed during transition");
            return;
        }
        self.schedule_write(&mut state);
    }

    /// Coalesce writes: one pending write at a time, and it snapshots whatever
    /// the state is when it fires.
    fn schedule_write(self: &Arc<Self>, state: &mut TimerState) {
        if state.pending_write.is_active() {
            return;
        }
        let weak = Arc::downgrade(self);
        let delay = self.config.snapshot_debounce();
        state.pending_write.start(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                let state = inner.lock();
                if state.status.has_open_session() {
                    inner.write_snapshot(&state);
                }
            }
        });
    }

    fn write_snapshot(&self, state: &TimerState) {
        let snapshot = state.snapshot(Instant::now(), self.lifecycle.clock().now());
        match self
            .lifecycle
            .repository()
            .write_snapshot(&self.user_id, &snapshot)
        {
            Ok(()) => tracing::debug!(
                user = %self.user_id,
                seconds = snapshot.session_seconds,
                "timer snapshot written"
            ),
            Err(error) => {
                tracing::error!(user = %self.user_id, %error, "failed to write timer snapshot");
            }
        }
    }

    fn clear_snapshot(&self) {
        if let Err(error) = self.lifecycle.repository().clear_snapshot(&self.user_id) {
            tracing::error!(user = %self.user_id, %error, "failed to clear timer snapshot");
        }
    }

    /// Keep the in-memory session when the store cannot settle it.
    fn continue_from_memory(self: &Arc<Self>, state: &mut TimerState) {
        if state.status == TimerStatus::Running {
            if state.running_since.is_none() {
                state.running_since = Some(Instant::now());
            }
            self.spawn_tick(state);
        }
    }

    /// Rebuild the state from the stored snapshot.
    ///
    /// The in-memory session is only dropped when the history positively
    /// shows it is no longer open; an unreadable history keeps it.
    fn restore_locked(self: &Arc<Self>, state: &mut TimerState) {
        state.cancel_tasks();

        let Some(snapshot) = self.lifecycle.repository().read_snapshot(&self.user_id) else {
            if state.status.has_open_session() {
                tracing::warn!(user = %self.user_id, "timer snapshot missing; continuing from memory");
                self.continue_from_memory(state);
            }
            return;
        };

        let (live, open) = match self.lifecycle.find_open_session(&self.user_id) {
            Ok(open) => {
                let live = match (&snapshot.current_session_id, &open) {
                    (Some(id), Some(open)) => open.id == *id,
                    _ => false,
                };
                (live, open)
            }
            Err(error) => {
                tracing::error!(
                    user = %self.user_id,
                    %error,
                    "session history unreadable; keeping timer state"
                );
                // A checkpoint of the session held in memory still applies.
                let own_checkpoint = state.status.has_open_session()
                    && snapshot.current_session_id.is_some()
                    && snapshot.current_session_id == state.session_id;
                if !own_checkpoint {
                    self.continue_from_memory(state);
                    return;
                }
                (true, None)
            }
        };
        if !live {
            if state.status.has_open_session() {
                tracing::error!(
                    user = %self.user_id,
                    session = ?state.session_id,
                    seconds = state.session_seconds(Instant::now()),
                    "session no longer open in history; discarding timer state"
                );
            } else {
                tracing::warn!(
                    user = %self.user_id,
                    session = ?snapshot.current_session_id,
                    "stale timer snapshot; clearing"
                );
            }
            self.clear_snapshot();
            state.reset();
            return;
        }

        let Reconciled {
            session_seconds,
            status,
        } = reconcile(&snapshot, self.lifecycle.clock().now());
        state.status = status;
        state.banked_seconds = session_seconds;
        state.running_since = (status == TimerStatus::Running).then(Instant::now);
        let book_in_memory = state.book_id.take();
        state.session_id = snapshot.current_session_id;
        state.book_id = snapshot
            .selected_book_id
            .or_else(|| open.map(|session| session.book_id))
            .or(book_in_memory);
        state.start_page = snapshot.start_page;
        if status == TimerStatus::Running {
            self.spawn_tick(state);
        }

        tracing::info!(
            user = %self.user_id,
            session = ?state.session_id,
            seconds = session_seconds,
            %status,
            "timer restored from snapshot"
        );
    }
}

fn ensure_transition(from: TimerStatus, to: TimerStatus) -> Result<(), TimerError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(TimerError::InvalidTransition { from, to })
    }
}

/// One user's reading timer. Cloning shares the same timer.
///
/// All methods that start background work must be called from within a Tokio
/// runtime.
pub struct ReadingTimer<R, C> {
    inner: Arc<Inner<R, C>>,
}

impl<R, C> Clone for ReadingTimer<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: SessionRepository, C: Clock> ReadingTimer<R, C> {
    /// Create an idle timer. Call [`ReadingTimer::restore`] to pick up a
    /// session left running by a previous process.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        lifecycle: Arc<SessionLifecycle<R, C>>,
        config: TimerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                user_id: user_id.into(),
                lifecycle,
                config,
                state: Mutex::new(TimerState::idle()),
            }),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    #[must_use]
    pub fn view(&self) -> TimerView {
        self.inner.lock().view(Instant::now())
    }

    #[must_use]
    pub fn status(&self) -> TimerStatus {
        self.inner.lock().status
    }

    /// Start reading `book_id` from `start_page`.
    ///
    /// Open sessions the user left behind are discarded first. Returns the new
    /// session id.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidTransition` unless idle, or
    /// `TimerError::Lifecycle` if the session record cannot be created.
    pub fn start(&self, book_id: &str, start_page: u32) -> Result<String, TimerError> {
        let mut state = self.inner.lock();
        ensure_transition(state.status, TimerStatus::Running)?;

        let lifecycle = &self.inner.lifecycle;
        lifecycle.abandon_orphans(&self.inner.user_id, None)?;
        let session_id = lifecycle.start_session(&self.inner.user_id, book_id, start_page)?;

        state.status = TimerStatus::Running;
        state.banked_seconds = 0;
        state.running_since = Some(Instant::now());
        state.session_id = Some(session_id.clone());
        state.book_id = Some(book_id.to_string());
        state.start_page = start_page;
        self.inner.spawn_tick(&mut state);
        self.inner.write_snapshot(&state);

        Ok(session_id)
    }

    /// Pause the running timer, keeping its seconds.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidTransition` unless running.
    pub fn pause(&self) -> Result<(), TimerError> {
        let mut state = self.inner.lock();
        ensure_transition(state.status, TimerStatus::Paused)?;

        state.cancel_tasks();
        state.bank(Instant::now());
        state.status = TimerStatus::Paused;
        self.inner.write_snapshot(&state);

        tracing::info!(user = %self.inner.user_id, seconds = state.banked_seconds, "timer paused");
        Ok(())
    }

    /// Resume a paused timer from its retained seconds.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidTransition` unless paused.
    pub fn resume(&self) -> Result<(), TimerError> {
        let mut state = self.inner.lock();
        ensure_transition(state.status, TimerStatus::Running)?;

        state.status = TimerStatus::Running;
        state.running_since = Some(Instant::now());
        self.inner.spawn_tick(&mut state);
        self.inner.write_snapshot(&state);

        tracing::info!(user = %self.inner.user_id, seconds = state.banked_seconds, "timer resumed");
        Ok(())
    }

    /// Stop the timer and close the session with the counted seconds as its
    /// duration.
    ///
    /// A missing session or failed write is logged; the timer returns to idle
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidTransition` unless running or paused.
    pub fn stop(&self, end_page: u32) -> Result<StopOutcome, TimerError> {
        let mut state = self.inner.lock();
        ensure_transition(state.status, TimerStatus::Stopped)?;

        state.cancel_tasks();
        let session_seconds = state.session_seconds(Instant::now());
        state.status = TimerStatus::Stopped;
        let session_id = state.session_id.clone();

        let ended = session_id.as_deref().map_or(Ok(EndOutcome::NotFound), |id| {
            self.inner
                .lifecycle
                .end_session(id, end_page, Some(session_seconds))
        });
        let outcome = match ended {
            Ok(EndOutcome::Closed(session)) => StopOutcome::Saved(session),
            Ok(EndOutcome::NotFound) => StopOutcome::NotSaved {
                session_id,
                session_seconds,
            },
            Err(error) => {
                tracing::error!(user = %self.inner.user_id, %error, "failed to save stopped session");
                StopOutcome::NotSaved {
                    session_id,
                    session_seconds,
                }
            }
        };

        self.inner.clear_snapshot();
        state.reset();
        tracing::info!(user = %self.inner.user_id, seconds = session_seconds, "timer stopped");
        Ok(outcome)
    }

    /// Throw the current session away without recording it.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidTransition` unless running or paused.
    pub fn discard(&self) -> Result<(), TimerError> {
        let mut state = self.inner.lock();
        ensure_transition(state.status, TimerStatus::Stopped)?;

        state.cancel_tasks();
        if let Some(id) = state.session_id.as_deref() {
            if let Err(error) = self.inner.lifecycle.discard_session(id) {
                tracing::error!(
                    user = %self.inner.user_id,
                    session = id,
                    %error,
                    "failed to discard session"
                );
            }
        }
        self.inner.clear_snapshot();
        state.reset();
        tracing::info!(user = %self.inner.user_id, "timer discarded");
        Ok(())
    }

    /// Checkpoint before the process is suspended.
    ///
    /// Stops the tick and any pending write, then writes the snapshot
    /// immediately. No-op while idle.
    pub fn on_suspend(&self) {
        let mut state = self.inner.lock();
        if !state.status.has_open_session() {
            return;
        }
        let now = Instant::now();
        state.cancel_tasks();
        state.bank(now);
        state.quiet_until = Some(now + self.inner.config.transition_quiet());
        self.inner.write_snapshot(&state);
        tracing::debug!(
            user = %self.inner.user_id,
            seconds = state.banked_seconds,
            "timer checkpointed for suspend"
        );
    }

    /// Reconcile after the process resumes.
    ///
    /// Adds the wall-clock time spent suspended to a running session and
    /// restarts the tick. Tick-driven snapshot writes stay suppressed for the
    /// configured quiet window.
    pub fn on_resume(&self) {
        let mut state = self.inner.lock();
        state.quiet_until = Some(Instant::now() + self.inner.config.transition_quiet());
        self.inner.restore_locked(&mut state);
    }

    /// Restore from the stored snapshot at launch.
    ///
    /// With no snapshot the timer stays idle. A snapshot pointing at a session
    /// that is no longer open is cleared.
    pub fn restore(&self) -> TimerView {
        let mut state = self.inner.lock();
        self.inner.restore_locked(&mut state);
        state.view(Instant::now())
    }
}
