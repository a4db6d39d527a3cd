//! Error types used by tasks, their consumers and the lifecycle runtime.
//!
//! This module defines three error enums:
//!
//! - [`TaskError`]: failures produced by the user work while it runs.
//! - [`WaitError`]: what a consumer blocked on the result gets back instead of a value.
//! - [`UsageError`]: API misuse rejected by the lifecycle (double start, reset while running, ...).
//!
//! All of them provide `as_label` for logs/metrics.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the work.
///
/// Returned from [`Work::run`](crate::Work::run) and from the [`Context`](crate::Context)
/// checkpoints. The lifecycle folds every variant into one [`Outcome`](crate::Outcome);
/// none of them escapes [`Task::run`](crate::Task::run).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The work deliberately declared failure.
    ///
    /// Expected control flow: reported as `Outcome::Error` without diagnostic logging.
    #[error("{error}")]
    Fail {
        /// Human-readable failure message.
        error: String,
    },

    /// A checkpoint observed a cancellation request.
    #[error("task cancelled")]
    Canceled,

    /// An interruptible wait was woken by an interrupt of the owning thread.
    #[error("task interrupted")]
    Interrupted,

    /// Any other error bubbled up from the work.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The work panicked.
    #[error("task panicked: {message}")]
    Panicked {
        /// Rendered panic payload.
        message: String,
    },
}

impl TaskError {
    /// Builds a deliberate failure.
    ///
    /// # Example
    /// ```
    /// use taskgate::TaskError;
    ///
    /// let err = TaskError::fail("no convergence");
    /// assert!(err.is_deliberate());
    /// assert_eq!(err.to_string(), "no convergence");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Wraps an arbitrary error as an unexpected failure.
    pub fn other(error: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        TaskError::Other(error.into())
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
            TaskError::Interrupted => "task_interrupted",
            TaskError::Other(_) => "task_error",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// True for failures the work declared on purpose.
    ///
    /// These never get diagnostic logging.
    pub fn is_deliberate(&self) -> bool {
        matches!(self, TaskError::Fail { .. })
    }

    /// True for faults nobody asked for: foreign errors and panics.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, TaskError::Other(_) | TaskError::Panicked { .. })
    }
}

/// # Errors returned by blocking (and async) result retrieval.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum WaitError {
    /// The task finished with `Outcome::Cancelled`.
    #[error("task was cancelled")]
    Canceled,

    /// The task finished with `Outcome::Error`; `source` is the captured failure.
    #[error("task failed: {source}")]
    Execution {
        /// The failure captured by the lifecycle.
        source: Arc<TaskError>,
    },

    /// The deadline passed before the task ended. The task itself is unaffected.
    #[error("timed out after {timeout:?} waiting for task")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

impl WaitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WaitError::Canceled => "wait_canceled",
            WaitError::Execution { .. } => "wait_execution_failed",
            WaitError::Timeout { .. } => "wait_timeout",
        }
    }

    /// Returns the captured task failure, if this is an execution failure.
    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            WaitError::Execution { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// # Lifecycle misuse.
///
/// Rejections are reported, never retried; the task state is left untouched.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum UsageError {
    /// Another thread currently owns the task.
    #[error("task rejected: already running on another thread")]
    AlreadyRunning,

    /// The task already ran; it must be reset before running again.
    #[error("task already ran; reset it before running again")]
    NotReset,

    /// `reset` was called between begun and ended.
    #[error("cannot reset a task while it is running")]
    ResetWhileRunning,

    /// Progress endpoints can only change before the task begins.
    #[error("progress endpoints must be set before the task begins")]
    EndpointsLocked,

    /// Endpoints must satisfy `0 <= begin <= end`.
    #[error("invalid progress endpoints (begin == {begin}, end == {end})")]
    InvalidEndpoints {
        /// Requested begin.
        begin: f64,
        /// Requested end.
        end: f64,
    },
}

impl UsageError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskgate::UsageError;
    ///
    /// assert_eq!(UsageError::AlreadyRunning.as_label(), "usage_already_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            UsageError::AlreadyRunning => "usage_already_running",
            UsageError::NotReset => "usage_not_reset",
            UsageError::ResetWhileRunning => "usage_reset_while_running",
            UsageError::EndpointsLocked => "usage_endpoints_locked",
            UsageError::InvalidEndpoints { .. } => "usage_invalid_endpoints",
        }
    }
}
