//! # Cancellation & pause coordinator.
//!
//! Converts requests arriving from any thread into control-flow effects at safe
//! points chosen by the work.
//!
//! ## Flow
//! ```text
//! request_cancel(force) ──► cancel = true ──► token.cancel() ──► owner interrupted ──► notify_all
//! request_pause()       ──► pause  = true ──► notify_all
//! resume()              ──► pause  = false ─► notify_all
//!
//! checkpoint() (owning thread):
//!   cancel?  ──► Err(Canceled)
//!   pause?   ──► fire TaskPaused
//!                └─► wait on cond (poll every `pause_poll`) until !pause || cancel
//!                      ├─ cancel ──► Err(Canceled)
//!                      └─ resumed ─► fire TaskResumed ──► Ok
//!   else     ──► Ok
//! ```
//!
//! ## Rules
//! - Cooperative only: work that never reaches a checkpoint or an interruptible
//!   wait is never preempted.
//! - Cancel is one-shot per run; a second request returns false.
//! - Pause only takes effect between begun and ended.

use std::sync::PoisonError;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use crate::core::interrupt;
use crate::core::shared::Shared;
use crate::error::TaskError;
use crate::events::EventKind;

impl<T> Shared<T> {
    /// Arms cancellation. See [`Task::request_cancel`](crate::Task::request_cancel).
    pub(crate) fn request_cancel(&self, force: bool) -> bool {
        if !self.is_begun() && !force {
            return false;
        }

        let state = self.lock();
        if self.is_ended() || self.cancel.swap(true, Ordering::SeqCst) {
            return false;
        }
        state.token.cancel();
        // Raised under the lock so an interruptible wait cannot miss it.
        self.owner.interrupt();
        self.cond.notify_all();
        drop(state);

        tracing::debug!(task = %self.name, force, "cancellation requested");
        true
    }

    pub(crate) fn request_pause(&self) -> bool {
        let _state = self.lock();
        if !self.in_window() {
            return false;
        }
        if self
            .pause
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        self.cond.notify_all();
        true
    }

    pub(crate) fn resume(&self) -> bool {
        let _state = self.lock();
        if self
            .pause
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        self.cond.notify_all();
        true
    }

    /// Interrupts the owner without cancelling. Returns false when nobody owns the task.
    pub(crate) fn interrupt(&self) -> bool {
        let mut state = self.lock();
        let hit = self.owner.interrupt();
        if hit {
            state.interrupted = true;
            self.cond.notify_all();
        }
        hit
    }

    /// Safe point: honors cancel, blocks while paused.
    pub(crate) fn checkpoint(&self) -> Result<(), TaskError> {
        if self.is_cancelled() {
            return Err(TaskError::Canceled);
        }
        if !self.is_paused() {
            return Ok(());
        }

        self.subscribers.emit(&self.event(EventKind::TaskPaused));

        let poll = self.config.pause_poll_clamped();
        let mut state = self.lock();
        while self.is_paused() && !self.is_cancelled() {
            state = self
                .cond
                .wait_timeout(state, poll)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        drop(state);

        if self.is_cancelled() {
            return Err(TaskError::Canceled);
        }
        self.subscribers.emit(&self.event(EventKind::TaskResumed));
        Ok(())
    }

    /// Interruptible sleep on the calling thread.
    ///
    /// Fails with `Interrupted` when the thread's interrupt flag is raised (the flag
    /// is consumed) and with `Canceled` when cancellation is armed.
    pub(crate) fn sleep(&self, dur: Duration) -> Result<(), TaskError> {
        let flag = interrupt::current();
        let deadline = Instant::now().checked_add(dur);

        let mut state = self.lock();
        loop {
            if flag.take() {
                return Err(TaskError::Interrupted);
            }
            if self.is_cancelled() {
                return Err(TaskError::Canceled);
            }
            state = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(());
                    }
                    self.cond
                        .wait_timeout(state, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self.cond.wait(state).unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Deliberate failure: recorded as pending, and also raised on the owning thread.
    ///
    /// The owner also gets the failure back as `Err`, but the pending slot is filled
    /// either way, so dropping that `Err` does not turn the run into a success.
    pub(crate) fn finish_with_error(&self, message: String) -> Result<(), TaskError> {
        let owned = self.owner.is_current();
        let err = TaskError::Fail { error: message };

        let mut state = self.lock();
        if self.is_ended() {
            tracing::debug!(task = %self.name, error = %err, "failure reported after task ended; ignored");
            return Ok(());
        }
        if owned {
            let raised = TaskError::fail(err.to_string());
            state.pending = Some(err);
            return Err(raised);
        }
        state.pending = Some(err);
        Ok(())
    }
}
