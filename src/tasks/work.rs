//! # The unit of work a task runs.
//!
//! [`Work`] is the caller-supplied computation: invoked once per run on the
//! owning thread with a [`Context`], returning a value or a [`TaskError`].
//! The function-backed form is [`WorkFn`](crate::WorkFn).
//!
//! Work contains no concurrency logic of its own; it calls
//! [`Context::checkpoint`] at safe points (directly, or via `post_message` /
//! `post_progress`) and leaves pause, cancellation and outcome bookkeeping to
//! the [`Task`](crate::Task).

use crate::core::Context;
use crate::error::TaskError;

/// # Cancelable, pausable unit of work.
///
/// # Example
/// ```
/// use taskgate::{Context, Task, TaskError, Work};
///
/// struct Mean(Vec<f64>);
///
/// impl Work for Mean {
///     type Output = f64;
///
///     fn name(&self) -> &str { "mean" }
///
///     fn run(&self, ctx: &Context) -> Result<f64, TaskError> {
///         if self.0.is_empty() {
///             return Err(TaskError::fail("no data"));
///         }
///         let mut sum = 0.0;
///         for (i, x) in self.0.iter().enumerate() {
///             ctx.checkpoint()?;
///             sum += x;
///             ctx.post_progress((i + 1) as f64 / self.0.len() as f64)?;
///         }
///         Ok(sum / self.0.len() as f64)
///     }
/// }
///
/// let task = Task::new(Mean(vec![1.0, 2.0, 3.0]));
/// task.run().unwrap();
/// assert_eq!(task.wait().unwrap(), 2.0);
/// ```
pub trait Work: Send + Sync + 'static {
    /// Value produced by a successful run.
    type Output: Send + 'static;

    /// Returns a stable, human-readable name.
    fn name(&self) -> &str;

    /// Performs the work.
    ///
    /// Return `Err(TaskError::Fail)` (or use [`Context::finish_with_error`]) for
    /// deliberate failures; propagate checkpoint errors with `?`.
    fn run(&self, ctx: &Context) -> Result<Self::Output, TaskError>;
}
