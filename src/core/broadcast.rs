//! # Progress/message broadcaster.
//!
//! Fires begun, message, progress and ended to the task's subscribers.
//! (Paused/resumed are fired from the checkpoint itself.)
//!
//! ## Rules
//! - `post_message` / `post_progress` pass through the checkpoint first, so every
//!   report doubles as a cancellation/pause point.
//! - Outside the begun..ended window reports are accepted and dropped.
//! - Begun and ended fire at most once per run.

use std::sync::Arc;

use crate::core::Outcome;
use crate::core::shared::Shared;
use crate::error::TaskError;
use crate::events::EventKind;

impl<T> Shared<T> {
    /// Fires `TaskBegun` and marks the task begun. No-op if already begun.
    pub(crate) fn fire_begun(&self) -> bool {
        if self.is_begun() {
            return false;
        }
        let ev = self
            .event(EventKind::TaskBegun)
            .with_message(format!("{} started", self.name));
        self.subscribers.emit(&ev);
        let _state = self.lock();
        self.set_begun(true);
        true
    }

    /// Fires `TaskEnded`. The caller guarantees it performed the ended transition.
    pub(crate) fn fire_ended(&self, outcome: Outcome, error: Option<&str>) {
        let message = match error {
            Some(error) => format!("{} finished: {} ({})", self.name, outcome, error),
            None => format!("{} finished: {}", self.name, outcome),
        };
        let ev = self
            .event(EventKind::TaskEnded)
            .with_outcome(outcome)
            .with_message(message);
        self.subscribers.emit(&ev);
    }

    pub(crate) fn post_message(&self, message: Arc<str>) -> Result<(), TaskError> {
        if !self.in_window() {
            return Ok(());
        }
        self.checkpoint()?;
        self.subscribers
            .emit(&self.event(EventKind::TaskMessage).with_message(message));
        Ok(())
    }

    /// Maps `raw` (a fraction of the work's own range) into the task's endpoints and fires it.
    pub(crate) fn post_progress(&self, raw: f64) -> Result<(), TaskError> {
        if !self.in_window() {
            return Ok(());
        }
        self.checkpoint()?;
        let progress = {
            let mut state = self.lock();
            state.progress = state.range.scale(raw);
            state.progress
        };
        self.subscribers
            .emit(&self.event(EventKind::TaskProgress).with_progress(progress));
        Ok(())
    }
}
