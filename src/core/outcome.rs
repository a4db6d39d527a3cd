//! # Terminal classification of a run.
//!
//! [`Outcome`] is the public view; [`Settled`] is what the lifecycle stores under
//! the task lock. A run moves `Pending → {Success, Cancelled, Failed}` exactly once.

use std::fmt;
use std::sync::Arc;

use crate::error::TaskError;

/// Outcome of a task run.
///
/// `NotFinished` until the run ends; afterwards exactly one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    /// The task has not ended (idle or running).
    #[default]
    NotFinished,
    /// The work returned a value and no failure was pending.
    Success,
    /// A cancellation request was honored.
    Cancelled,
    /// The work failed, deliberately or not.
    Error,
}

impl Outcome {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::NotFinished => "not_finished",
            Outcome::Success => "success",
            Outcome::Cancelled => "cancelled",
            Outcome::Error => "error",
        }
    }

    /// True for the three terminal outcomes.
    #[inline]
    pub fn is_finished(&self) -> bool {
        !matches!(self, Outcome::NotFinished)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Failure captured for a run that ended in `Outcome::Error`.
#[derive(Debug, Clone)]
pub(crate) struct Failure {
    pub(crate) cause: Arc<TaskError>,
    pub(crate) message: String,
}

impl Failure {
    pub(crate) fn new(cause: TaskError) -> Self {
        let message = cause.to_string();
        Self {
            cause: Arc::new(cause),
            message,
        }
    }
}

/// Stored state of the current run, success value included.
pub(crate) enum Settled<T> {
    Pending,
    Success(T),
    Cancelled,
    Failed(Failure),
}

impl<T> Default for Settled<T> {
    fn default() -> Self {
        Settled::Pending
    }
}

impl<T> Settled<T> {
    pub(crate) fn outcome(&self) -> Outcome {
        match self {
            Settled::Pending => Outcome::NotFinished,
            Settled::Success(_) => Outcome::Success,
            Settled::Cancelled => Outcome::Cancelled,
            Settled::Failed(_) => Outcome::Error,
        }
    }

    pub(crate) fn failure(&self) -> Option<&Failure> {
        match self {
            Settled::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Folds in a failure recorded off the owning thread.
    ///
    /// Only a successful run is turned into an error; cancellation and earlier
    /// failures keep their classification.
    pub(crate) fn with_pending(self, pending: Option<TaskError>) -> Self {
        match (self, pending) {
            (Settled::Success(_), Some(err)) => Settled::Failed(Failure::new(err)),
            (settled, _) => settled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_finished() {
        assert_eq!(Outcome::default(), Outcome::NotFinished);
        assert!(!Outcome::default().is_finished());
        assert_eq!(Settled::<()>::default().outcome(), Outcome::NotFinished);
    }

    #[test]
    fn test_pending_failure_overrides_success() {
        let settled = Settled::Success(7).with_pending(Some(TaskError::fail("helper")));
        assert_eq!(settled.outcome(), Outcome::Error);
        assert_eq!(settled.failure().map(|f| f.message.as_str()), Some("helper"));
    }

    #[test]
    fn test_pending_failure_keeps_cancellation() {
        let settled = Settled::<u8>::Cancelled.with_pending(Some(TaskError::fail("late")));
        assert_eq!(settled.outcome(), Outcome::Cancelled);
        assert!(settled.failure().is_none());
    }

    #[test]
    fn test_success_without_pending_is_kept() {
        let settled = Settled::Success("value").with_pending(None);
        assert_eq!(settled.outcome(), Outcome::Success);
        assert!(matches!(settled, Settled::Success("value")));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Outcome::Cancelled.to_string(), "cancelled");
        assert_eq!(Outcome::Error.as_label(), "error");
    }
}
