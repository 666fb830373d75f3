//! Session lifecycle: start, end, discard, list, orphan cleanup.
//!
//! Every read-modify-write of the session history runs under one lifecycle
//! gate, so two concurrent closes can never lose each other's update.

use std::sync::{Arc, Mutex, MutexGuard};

use leaf_core::calendar;
use leaf_core::clock::Clock;
use leaf_core::entities::ReadingSession;
use leaf_core::ids::{PREFIX_SESSION, generate_id};

use crate::error::{LifecycleError, StoreError};
use crate::repository::SessionRepository;

/// Result of [`SessionLifecycle::end_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// The open session was closed and persisted.
    Closed(ReadingSession),
    /// No open session has that id (never existed, discarded, or already closed).
    NotFound,
}

impl EndOutcome {
    /// The closed session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&ReadingSession> {
        match self {
            Self::Closed(session) => Some(session),
            Self::NotFound => None,
        }
    }
}

/// Creates, closes, and queries reading sessions on top of a [`SessionRepository`].
pub struct SessionLifecycle<R, C> {
    repo: Arc<R>,
    clock: C,
    gate: Mutex<()>,
}

impl<R: SessionRepository, C: Clock> SessionLifecycle<R, C> {
    pub fn new(repo: Arc<R>, clock: C) -> Self {
        Self {
            repo,
            clock,
            gate: Mutex::new(()),
        }
    }

    /// The shared repository.
    #[must_use]
    pub const fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, LifecycleError> {
        self.gate
            .lock()
            .map_err(|_| StoreError::LockPoisoned("session lifecycle gate").into())
    }

    /// Open a new session for `user_id` on `book_id` and persist it.
    ///
    /// Returns the new session id.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::SessionAlreadyOpen` if the user already has an
    /// open session, or `LifecycleError::Store` if the history cannot be read
    /// or written.
    pub fn start_session(
        &self,
        user_id: &str,
        book_id: &str,
        start_page: u32,
    ) -> Result<String, LifecycleError> {
        let _guard = self.lock()?;
        let mut sessions = self.repo.load_all()?;

        if let Some(open) = sessions
            .iter()
            .find(|s| s.user_id == user_id && !s.is_completed())
        {
            return Err(LifecycleError::SessionAlreadyOpen {
                user_id: user_id.to_string(),
                session_id: open.id.clone(),
            });
        }

        let now = self.clock.now();
        let id = generate_id(PREFIX_SESSION, now)?;
        let date = calendar::local_date(now, self.clock.offset());
        sessions.push(ReadingSession::open(
            id.clone(),
            user_id,
            book_id,
            start_page,
            now,
            date,
        ));

        self.repo.write_all(&sessions)?;
        tracing::info!(
            user = user_id,
            book = book_id,
            session = %id,
            start_page,
            "reading session started"
        );
        Ok(id)
    }

    /// Close the open session `session_id`.
    ///
    /// The duration is `duration_override` when given, otherwise the whole
    /// seconds between start and now (never negative). A missing or already
    /// closed session leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Store` if the history cannot be read or written.
    pub fn end_session(
        &self,
        session_id: &str,
        end_page: u32,
        duration_override: Option<u64>,
    ) -> Result<EndOutcome, LifecycleError> {
        let _guard = self.lock()?;
        let mut sessions = self.repo.load_all()?;

        let Some(session) = sessions
            .iter_mut()
            .find(|s| s.id == session_id && !s.is_completed())
        else {
            tracing::warn!(session = session_id, "no open session to end");
            return Ok(EndOutcome::NotFound);
        };

        let now = self.clock.now();
        let duration = duration_override
            .unwrap_or_else(|| calendar::whole_seconds_between(session.start_time, now));
        session.close(now, end_page, duration);
        let closed = session.clone();

        self.repo.write_all(&sessions)?;
        tracing::info!(
            user = %closed.user_id,
            session = session_id,
            duration,
            pages_read = closed.pages_read,
            "reading session ended"
        );
        Ok(EndOutcome::Closed(closed))
    }

    /// Remove the open session `session_id`. Closed sessions are never removed.
    ///
    /// Returns true if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Store` if the history cannot be read or written.
    pub fn discard_session(&self, session_id: &str) -> Result<bool, LifecycleError> {
        let _guard = self.lock()?;
        let mut sessions = self.repo.load_all()?;
        let before = sessions.len();
        sessions.retain(|s| s.id != session_id || s.is_completed());
        if sessions.len() == before {
            return Ok(false);
        }

        self.repo.write_all(&sessions)?;
        tracing::info!(session = session_id, "open session discarded");
        Ok(true)
    }

    /// The user's open session, if any.
    #[must_use]
    pub fn open_session(&self, user_id: &str) -> Option<ReadingSession> {
        self.repo
            .read_all()
            .into_iter()
            .find(|s| s.user_id == user_id && !s.is_completed())
    }

    /// Like [`SessionLifecycle::open_session`], but distinguishes "no open
    /// session" from "history unreadable".
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Store` if the history cannot be read.
    pub fn find_open_session(
        &self,
        user_id: &str,
    ) -> Result<Option<ReadingSession>, LifecycleError> {
        Ok(self
            .repo
            .load_all()?
            .into_iter()
            .find(|s| s.user_id == user_id && !s.is_completed()))
    }

    /// Discard every open session of `user_id` except `keep`.
    ///
    /// These are left behind when the process dies after starting a session
    /// but before its snapshot survived. Returns the discarded ids.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Store` if the history cannot be read or written.
    pub fn abandon_orphans(
        &self,
        user_id: &str,
        keep: Option<&str>,
    ) -> Result<Vec<String>, LifecycleError> {
        let _guard = self.lock()?;
        let mut sessions = self.repo.load_all()?;

        let is_orphan = |s: &ReadingSession| {
            s.user_id == user_id && !s.is_completed() && Some(s.id.as_str()) != keep
        };
        let orphans: Vec<String> = sessions
            .iter()
            .filter(|s| is_orphan(s))
            .map(|s| s.id.clone())
            .collect();
        if orphans.is_empty() {
            return Ok(orphans);
        }

        sessions.retain(|s| !is_orphan(s));
        self.repo.write_all(&sessions)?;
        for id in &orphans {
            tracing::warn!(user = user_id, session = %id, "abandoned orphaned open session");
        }
        Ok(orphans)
    }

    /// All sessions of `user_id`, newest start first.
    #[must_use]
    pub fn get_user_sessions(&self, user_id: &str) -> Vec<ReadingSession> {
        self.sessions_where(|s| s.user_id == user_id)
    }

    /// All sessions of `user_id` on `book_id`, newest start first.
    #[must_use]
    pub fn get_book_sessions(&self, user_id: &str, book_id: &str) -> Vec<ReadingSession> {
        self.sessions_where(|s| s.user_id == user_id && s.book_id == book_id)
    }

    fn sessions_where(&self, keep: impl Fn(&ReadingSession) -> bool) -> Vec<ReadingSession> {
        let mut sessions: Vec<ReadingSession> =
            self.repo.read_all().into_iter().filter(|s| keep(s)).collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        sessions
    }
}
