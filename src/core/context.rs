//! # The work's view of its task.
//!
//! [`Context`] is handed to [`Work::run`](crate::Work::run). It is the explicit
//! cancellation token of the run: poll it with [`checkpoint`](Context::checkpoint),
//! report through it, and block through it ([`sleep`](Context::sleep)) so
//! cancellation reaches blocked code too.
//!
//! [`Reporter`] is the `Send + Clone` piece for helper threads spawned by the work.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::shared::Shared;
use crate::error::TaskError;

/// Operations the work can trigger on its task, independent of the result type.
pub(crate) trait Coordinator: Send + Sync {
    fn name(&self) -> &str;
    fn checkpoint(&self) -> Result<(), TaskError>;
    fn post_message(&self, message: Arc<str>) -> Result<(), TaskError>;
    fn post_progress(&self, raw: f64) -> Result<(), TaskError>;
    fn sleep(&self, dur: Duration) -> Result<(), TaskError>;
    fn finish_with_error(&self, message: String) -> Result<(), TaskError>;
    fn is_cancelled(&self) -> bool;
    fn is_paused(&self) -> bool;
}

impl<T: Send + 'static> Coordinator for Shared<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn checkpoint(&self) -> Result<(), TaskError> {
        Shared::checkpoint(self)
    }

    fn post_message(&self, message: Arc<str>) -> Result<(), TaskError> {
        Shared::post_message(self, message)
    }

    fn post_progress(&self, raw: f64) -> Result<(), TaskError> {
        Shared::post_progress(self, raw)
    }

    fn sleep(&self, dur: Duration) -> Result<(), TaskError> {
        Shared::sleep(self, dur)
    }

    fn finish_with_error(&self, message: String) -> Result<(), TaskError> {
        Shared::finish_with_error(self, message)
    }

    fn is_cancelled(&self) -> bool {
        Shared::is_cancelled(self)
    }

    fn is_paused(&self) -> bool {
        Shared::is_paused(self)
    }
}

/// Handle the work uses to cooperate with its task.
///
/// # Example
/// ```
/// use taskgate::{Context, Task, TaskError, WorkFn};
///
/// let task = Task::new(WorkFn::new("sum", |ctx: &Context| {
///     let mut total = 0u64;
///     for i in 0..100u64 {
///         ctx.checkpoint()?;
///         total += i;
///         ctx.post_progress((i + 1) as f64 / 100.0)?;
///     }
///     Ok::<_, TaskError>(total)
/// }));
///
/// task.run().unwrap();
/// assert_eq!(task.wait().unwrap(), 4950);
/// ```
#[derive(Clone)]
pub struct Context {
    core: Arc<dyn Coordinator>,
    token: CancellationToken,
}

impl Context {
    pub(crate) fn new(core: Arc<dyn Coordinator>, token: CancellationToken) -> Self {
        Self { core, token }
    }

    /// Name of the task being run.
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Safe point: returns `Err(TaskError::Canceled)` once cancellation is requested,
    /// and blocks here while the task is paused.
    ///
    /// Propagate the error with `?`.
    pub fn checkpoint(&self) -> Result<(), TaskError> {
        self.core.checkpoint()
    }

    /// Posts a message to subscribers (passing through the checkpoint first).
    pub fn post_message(&self, message: impl Into<Arc<str>>) -> Result<(), TaskError> {
        self.core.post_message(message.into())
    }

    /// Posts progress as a fraction in `[0, 1]` of this work's own range.
    ///
    /// The value is mapped into the task's progress endpoints before subscribers see it.
    pub fn post_progress(&self, raw: f64) -> Result<(), TaskError> {
        self.core.post_progress(raw)
    }

    /// Sleeps up to `dur`, returning early with `Interrupted` or `Canceled`.
    pub fn sleep(&self, dur: Duration) -> Result<(), TaskError> {
        self.core.sleep(dur)
    }

    /// Declares a deliberate failure.
    ///
    /// The failure is recorded and the task ends in `Outcome::Error` when the work
    /// returns, even if the work goes on to return `Ok`. On the owning thread this
    /// also returns `Err(TaskError::Fail)` for `?` to unwind the work; from any other
    /// thread it returns `Ok(())`.
    pub fn finish_with_error(&self, message: impl Into<String>) -> Result<(), TaskError> {
        self.core.finish_with_error(message.into())
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.core.is_cancelled()
    }

    /// True while a pause is requested.
    pub fn is_paused(&self) -> bool {
        self.core.is_paused()
    }

    /// Token cancelled together with the task, for work blocked in async code.
    ///
    /// ```no_run
    /// # use taskgate::{Context, TaskError};
    /// # fn fetch(ctx: &Context, rt: &tokio::runtime::Runtime) -> Result<(), TaskError> {
    /// rt.block_on(async {
    ///     tokio::select! {
    ///         _ = ctx.token().cancelled() => Err(TaskError::Canceled),
    ///         _ = tokio::time::sleep(std::time::Duration::from_secs(30)) => Ok(()),
    ///     }
    /// })
    /// # }
    /// ```
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// A sendable handle for helper threads.
    pub fn reporter(&self) -> Reporter {
        Reporter {
            core: Arc::clone(&self.core),
            token: self.token.clone(),
        }
    }
}

/// Helper-thread handle to a running task.
///
/// Helpers never interrupt the owning thread: failures they report are
/// recorded and picked up when the work returns.
#[derive(Clone)]
pub struct Reporter {
    core: Arc<dyn Coordinator>,
    token: CancellationToken,
}

impl Reporter {
    /// Records a deliberate failure for the task. See [`Context::finish_with_error`].
    pub fn finish_with_error(&self, message: impl Into<String>) -> Result<(), TaskError> {
        self.core.finish_with_error(message.into())
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.core.is_cancelled()
    }

    /// Token cancelled together with the task.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
