//! # Lifecycle events fired by a running task.
//!
//! The [`EventKind`] enum classifies the six notifications a task emits:
//! begun, message, progress, paused, resumed and ended.
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! message text, mapped progress and the final outcome.
//!
//! ## Ordering guarantees
//! Events of one task are fired synchronously on its owning thread, so listeners
//! observe them in `seq` order. `seq` restarts from zero for each task instance and
//! keeps increasing across resets.
//!
//! ## Example
//! ```rust
//! use taskgate::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskMessage, 7)
//!     .with_task("clustering")
//!     .with_message("iteration 3");
//!
//! assert_eq!(ev.kind, EventKind::TaskMessage);
//! assert_eq!(ev.task.as_deref(), Some("clustering"));
//! assert_eq!(ev.message.as_deref(), Some("iteration 3"));
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use crate::core::Outcome;

/// Classification of task events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The task started running; always the first event of a run.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `message`: `"<name> started"`
    TaskBegun,

    /// The work posted a message (including the completion-time message).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `message`: message text
    TaskMessage,

    /// The work posted progress.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `progress`: raw fraction mapped into the task's endpoints
    TaskProgress,

    /// A checkpoint observed a pause request and is about to block.
    ///
    /// Sets:
    /// - `task`: task name
    TaskPaused,

    /// A paused checkpoint was resumed.
    ///
    /// Sets:
    /// - `task`: task name
    TaskResumed,

    /// The run is over; always the last event of a run.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `outcome`: final outcome
    /// - `message`: rendered outcome (with the error message, if any)
    TaskEnded,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::TaskBegun => "task_begun",
            EventKind::TaskMessage => "task_message",
            EventKind::TaskProgress => "task_progress",
            EventKind::TaskPaused => "task_paused",
            EventKind::TaskResumed => "task_resumed",
            EventKind::TaskEnded => "task_ended",
        }
    }
}

/// Task event with optional metadata.
///
/// - `seq`: per-task monotonic sequence
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Monotonically increasing sequence number within one task instance.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task that fired the event.
    pub task: Option<Arc<str>>,
    /// Human-readable text.
    pub message: Option<Arc<str>>,
    /// Mapped progress value.
    pub progress: Option<f64>,
    /// Final outcome (only for `TaskEnded`).
    pub outcome: Option<Outcome>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp.
    pub fn new(kind: EventKind, seq: u64) -> Self {
        Self {
            seq,
            at: SystemTime::now(),
            kind,
            task: None,
            message: None,
            progress: None,
            outcome: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Arc<str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches a progress value.
    #[inline]
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Attaches the final outcome.
    #[inline]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}
