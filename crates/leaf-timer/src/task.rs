//! Cancellable background task handle.

use std::future::Future;

use tokio::task::JoinHandle;

/// Owner of at most one spawned Tokio task.
///
/// Starting a new task aborts the previous one first, so two loops never run
/// side by side. Dropping the handle aborts the task.
#[derive(Debug, Default)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Abort any running task, then spawn `future` in its place.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(future));
    }

    /// Abort the task. Returns true if one was still running.
    pub fn cancel(&mut self) -> bool {
        self.handle.take().is_some_and(|handle| {
            let was_running = !handle.is_finished();
            handle.abort();
            was_running
        })
    }

    /// Whether a task is spawned and has not finished.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
