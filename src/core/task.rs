//! # Task: lifecycle state machine around one unit of work.
//!
//! Ties together the ownership guard, the cancellation/pause coordinator, the
//! broadcaster and the result channel.
//!
//! ## States
//! ```text
//!            run()                      work returns / fails / is cancelled
//!   Idle ───────────► Running ───────────────────────────────► Succeeded | Cancelled | Failed
//!    ▲                                                                   │
//!    └────────────────────────────── reset() ───────────────────────────┘
//! ```
//!
//! ## Run
//! ```text
//! acquire ownership ──(held elsewhere)──► Err(AlreadyRunning)
//!   ├─► clear pending failure
//!   ├─► fire TaskBegun, mark begun
//!   ├─► work.run(&ctx)                        (panics caught)
//!   │     ├─ Ok(v)           ─► post "<elapsed> to complete task" ─► Success(v)
//!   │     ├─ Err(Fail)       ─► Failed                 (no diagnostics)
//!   │     ├─ Err(Canceled)   ─► Cancelled
//!   │     ├─ Err(Interrupted)─► Cancelled if cancel armed, else Failed + interrupt re-asserted
//!   │     └─ Err(other)/panic─► Failed                 (logged at error!)
//!   ├─► fold pending helper failure (Success → Failed)
//!   ├─► [lock] store outcome, ended = true, wake waiters [unlock]
//!   ├─► fire TaskEnded
//!   └─► release ownership
//! ```
//!
//! ## Rules
//! - Nothing the work does escapes `run`; consumers read the outcome or call `wait`.
//! - The outcome changes exactly once per run, together with `ended`.
//! - `reset` is only legal after the run ended; it never touches a running task.

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::core::config::TaskConfig;
use crate::core::context::{Context, Coordinator};
use crate::core::elapsed;
use crate::core::interrupt;
use crate::core::outcome::{Failure, Outcome, Settled};
use crate::core::progress::ProgressRange;
use crate::core::shared::Shared;
use crate::error::{TaskError, UsageError, WaitError};
use crate::subscribers::{Subscribe, SubscriberId, panic_message};
use crate::tasks::Work;

struct Inner<W: Work> {
    work: W,
    shared: Arc<Shared<W::Output>>,
}

/// A cancelable, pausable, observable run of some [`Work`].
///
/// `Task` is a cheap handle (`Arc` inside): clone it to hand the same instance to
/// the executing thread, to controllers and to consumers.
///
/// ### Responsibilities
/// - **Single owner**: at most one thread runs the instance at a time
/// - **Cooperative control**: cancel/pause requests from any thread, honored at checkpoints
/// - **Observation**: begun/message/progress/paused/resumed/ended to subscribers
/// - **Result**: blocking, bounded and async retrieval of the outcome
///
/// # Example
/// ```
/// use std::time::Duration;
/// use taskgate::{Context, Outcome, Task, TaskError, WorkFn};
///
/// let task = Task::new(WorkFn::new("countdown", |ctx: &Context| {
///     for i in (0..3).rev() {
///         ctx.post_message(format!("{i}..."))?;
///         ctx.sleep(Duration::from_millis(5))?;
///     }
///     Ok::<_, TaskError>("liftoff")
/// }));
///
/// let handle = task.spawn().unwrap();
/// assert_eq!(task.wait_timeout(Duration::from_secs(5)).unwrap(), "liftoff");
/// assert_eq!(handle.join().unwrap(), Ok(Outcome::Success));
/// ```
pub struct Task<W: Work> {
    inner: Arc<Inner<W>>,
}

impl<W: Work> Clone for Task<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Work> fmt::Debug for Task<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name())
            .field("outcome", &self.outcome())
            .field("begun", &self.is_begun())
            .field("ended", &self.is_ended())
            .field("cancelled", &self.is_cancelled())
            .field("paused", &self.is_paused())
            .finish()
    }
}

impl<W: Work> Task<W> {
    /// Creates a task with the default [`TaskConfig`].
    pub fn new(work: W) -> Self {
        Self::with_config(work, TaskConfig::default())
    }

    /// Creates a task with explicit configuration.
    pub fn with_config(work: W, config: TaskConfig) -> Self {
        let name: Arc<str> = Arc::from(work.name());
        Self {
            inner: Arc::new(Inner {
                work,
                shared: Arc::new(Shared::new(name, config)),
            }),
        }
    }

    fn shared(&self) -> &Shared<W::Output> {
        &self.inner.shared
    }

    /// Task name (taken from the work).
    pub fn name(&self) -> &str {
        &self.shared().name
    }

    /// Configuration the task was built with.
    pub fn config(&self) -> &TaskConfig {
        &self.shared().config
    }

    // ---- Observers ----

    /// Registers a subscriber. Usually done before the task is started.
    pub fn subscribe(&self, sub: Arc<dyn Subscribe>) -> SubscriberId {
        self.shared().subscribers.add(sub)
    }

    /// Unregisters a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.shared().subscribers.remove(id)
    }

    // ---- Progress ----

    /// Sets the `[begin, end]` range raw progress is mapped into.
    ///
    /// Only legal before the task begins; requires `0 <= begin <= end`.
    pub fn set_progress_endpoints(&self, begin: f64, end: f64) -> Result<(), UsageError> {
        let range = ProgressRange::new(begin, end)?;
        let shared = self.shared();
        let mut state = shared.lock();
        if shared.is_begun() {
            return Err(UsageError::EndpointsLocked);
        }
        state.range = range;
        Ok(())
    }

    /// Progress reported for a raw fraction of `0.0`.
    pub fn begin_progress(&self) -> f64 {
        self.shared().lock().range.begin()
    }

    /// Progress reported for a raw fraction of `1.0`.
    pub fn end_progress(&self) -> f64 {
        self.shared().lock().range.end()
    }

    /// Last progress posted by the work, mapped into the endpoints.
    pub fn progress(&self) -> f64 {
        self.shared().lock().progress
    }

    // ---- Lifecycle ----

    /// Runs the work on the calling thread, which becomes the owner for the duration.
    ///
    /// Returns the outcome of the run. Fails fast, without touching the task, if
    /// another thread owns it (`AlreadyRunning`) or it already ran and was not reset
    /// (`NotReset`).
    pub fn run(&self) -> Result<Outcome, UsageError> {
        let shared = self.shared();

        if let Err(err) = shared.owner.acquire() {
            tracing::warn!(task = %shared.name, error = %err, "start rejected");
            return Err(err);
        }
        if shared.is_begun() {
            shared.owner.release();
            tracing::warn!(task = %shared.name, "start rejected: task already ran");
            return Err(UsageError::NotReset);
        }

        let token = {
            let mut state = shared.lock();
            state.pending = None;
            state.interrupted = false;
            state.token.clone()
        };

        shared.fire_begun();
        tracing::debug!(task = %shared.name, "task begun");

        let core: Arc<dyn Coordinator> = self.inner.shared.clone();
        let ctx = Context::new(core, token);

        let started = Instant::now();
        let res = panic::catch_unwind(AssertUnwindSafe(|| self.inner.work.run(&ctx)));
        let taken = started.elapsed();

        let settled = match res {
            Ok(Ok(value)) => {
                let message = format!("{} to complete task", elapsed::describe(taken));
                match shared.post_message(message.into()) {
                    Ok(()) => Settled::Success(value),
                    Err(err) => self.classify(err),
                }
            }
            Ok(Err(err)) => self.classify(err),
            Err(payload) => self.classify(TaskError::Panicked {
                message: panic_message(payload.as_ref()),
            }),
        };

        Ok(self.finish(settled))
    }

    /// Folds an error from the work into a terminal state.
    fn classify(&self, err: TaskError) -> Settled<W::Output> {
        let shared = self.shared();
        match err {
            TaskError::Canceled => Settled::Cancelled,
            TaskError::Interrupted if shared.is_cancelled() => Settled::Cancelled,
            TaskError::Interrupted => {
                // Consumed by the interrupted wait; restore it for callers up the stack.
                interrupt::current().raise();
                tracing::debug!(task = %shared.name, "task interrupted without cancellation");
                Settled::Failed(Failure::new(err))
            }
            err if err.is_unexpected() => {
                if shared.config.log_unexpected {
                    tracing::error!(
                        task = %shared.name,
                        label = err.as_label(),
                        error = %err,
                        details = ?err,
                        "unexpected failure in task"
                    );
                }
                Settled::Failed(Failure::new(err))
            }
            err => {
                tracing::debug!(task = %shared.name, error = %err, "task failed");
                Settled::Failed(Failure::new(err))
            }
        }
    }

    /// Commits the outcome, wakes waiters, fires ended and releases ownership.
    fn finish(&self, settled: Settled<W::Output>) -> Outcome {
        let shared = self.shared();

        let (fire, outcome, error, cancelled, interrupted) = {
            let mut state = shared.lock();
            let pending = state.pending.take();
            state.settled = settled.with_pending(pending);
            let outcome = state.settled.outcome();
            let error = state.settled.failure().map(|f| f.message.clone());
            let fire = shared.is_begun() && shared.mark_ended(&state);
            (fire, outcome, error, shared.is_cancelled(), state.interrupted)
        };

        if interrupted {
            // Explicit interrupts stay visible to the caller, even if the wait consumed them.
            interrupt::current().raise();
        } else if cancelled {
            // Raised only on behalf of the cancellation; do not leak it.
            interrupt::clear_interrupt();
        }
        if fire {
            shared.fire_ended(outcome, error.as_deref());
        }
        shared.owner.release();

        tracing::debug!(task = %shared.name, outcome = %outcome, "task ended");
        outcome
    }

    /// Runs the task on a new dedicated thread named after it.
    pub fn spawn(&self) -> io::Result<JoinHandle<Result<Outcome, UsageError>>> {
        let task = self.clone();
        thread::Builder::new()
            .name(self.config().thread_name(self.name()))
            .spawn(move || task.run())
    }

    /// Restores the initial, reusable state after a finished run.
    ///
    /// No-op if the task never began. Rejected with `ResetWhileRunning`, without
    /// side effects, between begun and ended.
    pub fn reset(&self) -> Result<(), UsageError> {
        let shared = self.shared();
        let mut state = shared.lock();
        if !shared.is_begun() {
            return Ok(());
        }
        if !shared.is_ended() {
            tracing::error!(task = %shared.name, "reset called while the task is running");
            return Err(UsageError::ResetWhileRunning);
        }

        state.settled = Settled::Pending;
        state.pending = None;
        state.interrupted = false;
        state.progress = 0.0;
        state.token = CancellationToken::new();
        shared.cancel.store(false, std::sync::atomic::Ordering::SeqCst);
        shared.pause.store(false, std::sync::atomic::Ordering::SeqCst);
        shared.set_begun(false);
        shared.clear_ended(&state);
        drop(state);

        tracing::debug!(task = %shared.name, "task reset");
        Ok(())
    }

    // ---- Control ----

    /// Requests cancellation.
    ///
    /// Returns false without effect if the task has not begun and `force` is false,
    /// if it is already cancelled, or if it already ended. Otherwise arms the cancel
    /// flag, releases a paused checkpoint, cancels the run's token, interrupts the
    /// owning thread and returns true.
    ///
    /// With `force`, a task that has not begun is cancelled at its first checkpoint.
    pub fn request_cancel(&self, force: bool) -> bool {
        self.shared().request_cancel(force)
    }

    /// Pauses the running task at its next checkpoint. False if not running or already paused.
    pub fn request_pause(&self) -> bool {
        self.shared().request_pause()
    }

    /// Releases a pause. False if the task was not paused.
    pub fn resume(&self) -> bool {
        self.shared().resume()
    }

    /// Interrupts the owning thread without cancelling.
    ///
    /// An interruptible wait inside the work fails with `TaskError::Interrupted`;
    /// unless cancellation is armed the run ends in `Outcome::Error` and the
    /// interrupt stays set on the owning thread.
    pub fn interrupt(&self) -> bool {
        self.shared().interrupt()
    }

    // ---- Status ----

    /// Current outcome; `NotFinished` iff the task is not done.
    pub fn outcome(&self) -> Outcome {
        self.shared().lock().settled.outcome()
    }

    /// Message of the failure that ended the run, if it ended in `Outcome::Error`.
    pub fn error_message(&self) -> Option<String> {
        self.shared()
            .lock()
            .settled
            .failure()
            .map(|f| f.message.clone())
    }

    /// Failure that ended the run, if it ended in `Outcome::Error`.
    pub fn failure(&self) -> Option<Arc<TaskError>> {
        self.shared()
            .lock()
            .settled
            .failure()
            .map(|f| Arc::clone(&f.cause))
    }

    /// True once `TaskBegun` fired for the current run.
    pub fn is_begun(&self) -> bool {
        self.shared().is_begun()
    }

    /// True once the current run committed its outcome.
    pub fn is_ended(&self) -> bool {
        self.shared().is_ended()
    }

    /// Same as [`is_ended`](Self::is_ended).
    pub fn is_done(&self) -> bool {
        self.shared().is_ended()
    }

    /// True once cancellation was accepted for the current run.
    pub fn is_cancelled(&self) -> bool {
        self.shared().is_cancelled()
    }

    /// True while a pause is requested.
    pub fn is_paused(&self) -> bool {
        self.shared().is_paused()
    }

    /// True while some thread owns the task.
    pub fn is_running(&self) -> bool {
        self.shared().owner.is_held()
    }
}

impl<W> Task<W>
where
    W: Work,
    W::Output: Clone,
{
    /// Blocks until the run ends, then returns its value or why there is none.
    pub fn wait(&self) -> Result<W::Output, WaitError> {
        self.shared().wait_ended().resolve()
    }

    /// Like [`wait`](Self::wait), giving up with `WaitError::Timeout` after `timeout`.
    ///
    /// A timeout does not affect the task.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<W::Output, WaitError> {
        self.shared().wait_ended_timeout(timeout)?.resolve()
    }

    /// Async form of [`wait`](Self::wait).
    pub async fn wait_async(&self) -> Result<W::Output, WaitError> {
        self.shared().ended().await;
        self.shared().lock().resolve()
    }

    /// Async form of [`wait_timeout`](Self::wait_timeout).
    pub async fn wait_async_timeout(&self, timeout: Duration) -> Result<W::Output, WaitError> {
        tokio::time::timeout(timeout, self.wait_async())
            .await
            .map_err(|_| WaitError::Timeout { timeout })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interrupt::is_interrupted;
    use crate::events::{Event, EventKind};
    use crate::tasks::WorkFn;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Barrier, Mutex};

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<Event>>,
    }

    impl Recorder {
        fn kinds(&self) -> Vec<EventKind> {
            self.events.lock().unwrap().iter().map(|e| e.kind).collect()
        }

        fn has(&self, kind: EventKind) -> bool {
            self.kinds().contains(&kind)
        }

        fn messages(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.kind == EventKind::TaskMessage)
                .filter_map(|e| e.message.as_deref().map(str::to_string))
                .collect()
        }

        fn progress(&self) -> Vec<f64> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| e.progress)
                .collect()
        }

        fn last(&self) -> Event {
            self.events.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Subscribe for Recorder {
        fn on_event(&self, event: &Event) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn recorded<W: Work>(task: &Task<W>) -> Arc<Recorder> {
        let rec = Arc::new(Recorder::default());
        task.subscribe(rec.clone());
        rec
    }

    /// Polls `cond` until it holds, failing the test after a few seconds.
    fn eventually(what: &str, cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out waiting for: {what}");
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Work that blocks between two barriers so tests can act while it runs.
    fn gated(
        name: &'static str,
    ) -> (
        Task<impl Work<Output = u32>>,
        Arc<Barrier>,
        Arc<Barrier>,
    ) {
        let started = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let (s, r) = (started.clone(), release.clone());
        let task = Task::new(WorkFn::new(name, move |_ctx: &Context| {
            s.wait();
            r.wait();
            Ok::<_, TaskError>(1u32)
        }));
        (task, started, release)
    }

    /// Work that counts until cancelled, yielding at a checkpoint each round.
    fn counter(name: &'static str) -> (Task<impl Work<Output = ()>>, Arc<AtomicU64>) {
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let task = Task::new(WorkFn::new(name, move |ctx: &Context| -> Result<(), TaskError> {
            loop {
                ctx.checkpoint()?;
                c.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(1));
            }
        }));
        (task, count)
    }

    #[test]
    fn test_success_sets_outcome_and_value() {
        let task = Task::new(WorkFn::new("answer", |_ctx: &Context| Ok::<_, TaskError>(42)));
        let rec = recorded(&task);

        assert_eq!(task.outcome(), Outcome::NotFinished);
        assert!(!task.is_done());

        assert_eq!(task.run(), Ok(Outcome::Success));
        assert_eq!(task.outcome(), Outcome::Success);
        assert!(task.is_done());
        assert!(!task.is_running());
        assert_eq!(task.wait().unwrap(), 42);
        assert_eq!(task.error_message(), None);

        let kinds = rec.kinds();
        assert_eq!(kinds.first(), Some(&EventKind::TaskBegun));
        assert_eq!(kinds.last(), Some(&EventKind::TaskEnded));
        assert!(rec.messages().iter().any(|m| m.ends_with("to complete task")));

        let ended = rec.last();
        assert_eq!(ended.outcome, Some(Outcome::Success));
        assert_eq!(ended.message.as_deref(), Some("answer finished: success"));
    }

    #[test]
    fn test_wait_timeout_before_start() {
        let task = Task::new(WorkFn::new("idle", |_ctx: &Context| Ok::<_, TaskError>(())));
        let err = task.wait_timeout(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, WaitError::Timeout { .. }));
        assert_eq!(task.outcome(), Outcome::NotFinished);
    }

    #[test]
    fn test_concurrent_start_rejected() {
        let (task, started, release) = gated("gated");
        let handle = task.spawn().unwrap();
        started.wait();

        assert!(task.is_running());
        assert_eq!(task.run(), Err(UsageError::AlreadyRunning));

        release.wait();
        assert_eq!(handle.join().unwrap(), Ok(Outcome::Success));
        assert_eq!(task.wait().unwrap(), 1);
    }

    #[test]
    fn test_rerun_without_reset_rejected() {
        let task = Task::new(WorkFn::new("once", |_ctx: &Context| Ok::<_, TaskError>(())));
        assert_eq!(task.run(), Ok(Outcome::Success));
        assert_eq!(task.run(), Err(UsageError::NotReset));
        assert_eq!(task.outcome(), Outcome::Success);
    }

    #[test]
    fn test_cancel_before_start_needs_force() {
        let task = Task::new(WorkFn::new("early", |ctx: &Context| {
            ctx.checkpoint()?;
            Ok::<_, TaskError>(())
        }));

        assert!(!task.request_cancel(false));
        assert!(!task.is_cancelled());

        assert!(task.request_cancel(true));
        assert!(task.is_cancelled());
        assert!(!task.request_cancel(true));

        assert_eq!(task.run(), Ok(Outcome::Cancelled));
        assert!(matches!(task.wait(), Err(WaitError::Canceled)));
    }

    #[test]
    fn test_cancel_after_end_is_rejected() {
        let task = Task::new(WorkFn::new("done", |_ctx: &Context| Ok::<_, TaskError>(())));
        task.run().unwrap();
        assert!(!task.request_cancel(false));
        assert!(!task.request_cancel(true));
        assert!(!task.is_cancelled());
        assert_eq!(task.outcome(), Outcome::Success);
    }

    #[test]
    fn test_pause_resume_cancel() {
        let (task, count) = counter("counter");
        let rec = recorded(&task);
        assert!(!task.request_pause());

        let handle = task.spawn().unwrap();
        eventually("counter running", || count.load(Ordering::SeqCst) > 5);

        assert!(task.request_pause());
        assert!(!task.request_pause());
        assert!(task.is_paused());
        eventually("paused event", || rec.has(EventKind::TaskPaused));

        let frozen = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), frozen);

        assert!(task.resume());
        assert!(!task.resume());
        eventually("counter advancing", || count.load(Ordering::SeqCst) > frozen);
        assert!(rec.has(EventKind::TaskResumed));

        assert!(task.request_cancel(false));
        assert_eq!(handle.join().unwrap(), Ok(Outcome::Cancelled));
        assert_eq!(rec.last().outcome, Some(Outcome::Cancelled));
    }

    #[test]
    fn test_cancel_releases_paused_checkpoint() {
        let (task, count) = counter("paused-cancel");
        let rec = recorded(&task);
        let handle = task.spawn().unwrap();
        eventually("counter running", || count.load(Ordering::SeqCst) > 0);

        assert!(task.request_pause());
        eventually("paused event", || rec.has(EventKind::TaskPaused));
        assert!(task.request_cancel(false));

        assert_eq!(handle.join().unwrap(), Ok(Outcome::Cancelled));
        assert!(!rec.has(EventKind::TaskResumed));
    }

    #[test]
    fn test_wait_timeout_then_wait() {
        let task = Task::new(WorkFn::new("sleepy", |ctx: &Context| {
            ctx.sleep(Duration::from_millis(200))?;
            Ok::<_, TaskError>(7)
        }));
        let handle = task.spawn().unwrap();

        let err = task.wait_timeout(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, WaitError::Timeout { .. }));

        assert_eq!(task.wait().unwrap(), 7);
        assert_eq!(handle.join().unwrap(), Ok(Outcome::Success));
    }

    #[test]
    fn test_progress_mapped_into_endpoints() {
        let task = Task::new(WorkFn::new("mapped", |ctx: &Context| {
            for raw in [0.0, 0.5, 1.0, 1.5] {
                ctx.post_progress(raw)?;
            }
            Ok::<_, TaskError>(())
        }));
        let rec = recorded(&task);

        assert_eq!(
            task.set_progress_endpoints(0.8, 0.2),
            Err(UsageError::InvalidEndpoints { begin: 0.8, end: 0.2 })
        );
        task.set_progress_endpoints(0.2, 0.8).unwrap();
        assert_eq!(task.begin_progress(), 0.2);
        assert_eq!(task.end_progress(), 0.8);

        task.run().unwrap();

        let seen = rec.progress();
        let want = [0.2, 0.5, 0.8, 0.8];
        assert_eq!(seen.len(), want.len());
        for (got, want) in seen.iter().zip(want) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
        assert!((task.progress() - 0.8).abs() < 1e-9);

        assert_eq!(
            task.set_progress_endpoints(0.0, 1.0),
            Err(UsageError::EndpointsLocked)
        );
    }

    #[test]
    fn test_reset_and_rerun() {
        let runs = Arc::new(AtomicU64::new(0));
        let r = runs.clone();
        let task = Task::new(WorkFn::new("again", move |ctx: &Context| {
            ctx.post_progress(1.0)?;
            Ok::<_, TaskError>(r.fetch_add(1, Ordering::SeqCst) + 1)
        }));

        assert_eq!(task.reset(), Ok(()));
        assert_eq!(task.run(), Ok(Outcome::Success));
        assert_eq!(task.wait().unwrap(), 1);

        task.reset().unwrap();
        assert_eq!(task.outcome(), Outcome::NotFinished);
        assert!(!task.is_done());
        assert!(!task.is_begun());
        assert_eq!(task.progress(), 0.0);

        assert_eq!(task.run(), Ok(Outcome::Success));
        assert_eq!(task.wait().unwrap(), 2);
    }

    #[test]
    fn test_reset_clears_cancellation() {
        let task = Task::new(WorkFn::new("cleared", |ctx: &Context| {
            ctx.checkpoint()?;
            Ok::<_, TaskError>(())
        }));
        task.request_cancel(true);
        assert_eq!(task.run(), Ok(Outcome::Cancelled));

        task.reset().unwrap();
        assert!(!task.is_cancelled());
        assert_eq!(task.run(), Ok(Outcome::Success));
    }

    #[test]
    fn test_reset_while_running_rejected() {
        let (task, started, release) = gated("busy");
        let handle = task.spawn().unwrap();
        started.wait();

        assert_eq!(task.reset(), Err(UsageError::ResetWhileRunning));
        assert!(task.is_begun());
        assert!(!task.is_done());

        release.wait();
        assert_eq!(handle.join().unwrap(), Ok(Outcome::Success));
    }

    #[test]
    fn test_helper_failure_ends_in_error() {
        let task = Task::new(WorkFn::new("helper", |ctx: &Context| {
            let reporter = ctx.reporter();
            thread::spawn(move || reporter.finish_with_error("disk full"))
                .join()
                .unwrap()?;
            Ok::<_, TaskError>(5)
        }));

        assert_eq!(task.run(), Ok(Outcome::Error));
        assert_eq!(task.error_message().as_deref(), Some("disk full"));
        let err = task.wait().unwrap_err();
        assert!(matches!(err.task_error(), Some(TaskError::Fail { .. })));
    }

    #[test]
    fn test_owner_failure_unwinds_work() {
        let reached = Arc::new(AtomicU64::new(0));
        let r = reached.clone();
        let task = Task::new(WorkFn::new("owner", move |ctx: &Context| {
            ctx.finish_with_error("bad input")?;
            r.store(1, Ordering::SeqCst);
            Ok::<_, TaskError>(())
        }));

        assert_eq!(task.run(), Ok(Outcome::Error));
        assert_eq!(reached.load(Ordering::SeqCst), 0);
        assert_eq!(task.error_message().as_deref(), Some("bad input"));
    }

    #[test]
    fn test_dropped_owner_failure_still_ends_in_error() {
        let task = Task::new(WorkFn::new("swallow", |ctx: &Context| {
            let _ = ctx.finish_with_error("declared");
            Ok::<_, TaskError>(1)
        }));

        assert_eq!(task.run(), Ok(Outcome::Error));
        assert_eq!(task.error_message().as_deref(), Some("declared"));
        assert!(matches!(
            task.wait().unwrap_err().task_error(),
            Some(TaskError::Fail { .. })
        ));
    }

    #[test]
    fn test_pause_after_end_has_no_effect() {
        let task = Task::new(WorkFn::new("finished", |_ctx: &Context| Ok::<_, TaskError>(3)));
        task.run().unwrap();

        assert!(!task.request_pause());
        assert!(!task.is_paused());
        assert!(!task.resume());
        assert_eq!(task.outcome(), Outcome::Success);
        assert_eq!(task.wait().unwrap(), 3);
    }

    #[test]
    fn test_interrupt_survives_later_cancel() {
        let task = Task::new(WorkFn::new("nap", |ctx: &Context| {
            // Shrug off the first wake-up; only cancellation ends the run.
            let _ = ctx.sleep(Duration::from_secs(30));
            ctx.sleep(Duration::from_secs(30))?;
            Ok::<_, TaskError>(())
        }));

        let t = task.clone();
        let handle = thread::spawn(move || {
            let outcome = t.run();
            (outcome, is_interrupted())
        });
        eventually("begun", || task.is_begun());
        assert!(task.interrupt());
        assert!(task.request_cancel(false));

        let (outcome, still_interrupted) = handle.join().unwrap();
        assert_eq!(outcome, Ok(Outcome::Cancelled));
        assert!(still_interrupted);
    }

    #[test]
    fn test_interrupt_without_cancel_is_error() {
        let task = Task::new(WorkFn::new("nap", |ctx: &Context| {
            ctx.sleep(Duration::from_secs(30))?;
            Ok::<_, TaskError>(())
        }));
        assert!(!task.interrupt());

        let t = task.clone();
        let handle = thread::spawn(move || {
            let outcome = t.run();
            (outcome, is_interrupted())
        });
        eventually("owner", || task.is_running());
        assert!(task.interrupt());

        let (outcome, still_interrupted) = handle.join().unwrap();
        assert_eq!(outcome, Ok(Outcome::Error));
        assert!(still_interrupted);
        assert!(matches!(task.failure().as_deref(), Some(TaskError::Interrupted)));
    }

    #[test]
    fn test_cancel_during_sleep() {
        let task = Task::new(WorkFn::new("nap", |ctx: &Context| {
            ctx.sleep(Duration::from_secs(30))?;
            Ok::<_, TaskError>(())
        }));

        let t = task.clone();
        let handle = thread::spawn(move || {
            let outcome = t.run();
            (outcome, is_interrupted())
        });
        eventually("begun", || task.is_begun());

        let started = Instant::now();
        assert!(task.request_cancel(false));
        assert!(!task.request_cancel(false));

        let (outcome, still_interrupted) = handle.join().unwrap();
        assert_eq!(outcome, Ok(Outcome::Cancelled));
        assert!(!still_interrupted);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_token_follows_cancellation() {
        let task = Task::new(WorkFn::new("token", |ctx: &Context| {
            assert_eq!(ctx.name(), "token");
            while !ctx.token().is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
            assert!(ctx.is_cancelled());
            Err::<(), _>(TaskError::Canceled)
        }));
        let handle = task.spawn().unwrap();
        eventually("begun", || task.is_begun());

        assert!(task.request_cancel(false));
        assert_eq!(handle.join().unwrap(), Ok(Outcome::Cancelled));
    }

    #[test]
    fn test_panic_in_work_is_error() {
        let task = Task::new(WorkFn::new("boom", |_ctx: &Context| -> Result<(), TaskError> {
            panic!("kaboom")
        }));
        let rec = recorded(&task);

        assert_eq!(task.run(), Ok(Outcome::Error));
        assert!(matches!(
            task.failure().as_deref(),
            Some(TaskError::Panicked { message }) if message == "kaboom"
        ));
        assert!(!task.is_running());
        assert_eq!(rec.last().kind, EventKind::TaskEnded);
    }

    #[test]
    fn test_unexpected_error_is_error() {
        let task = Task::new(WorkFn::new("io", |_ctx: &Context| -> Result<(), TaskError> {
            Err(TaskError::other(std::io::Error::other("socket closed")))
        }));

        assert_eq!(task.run(), Ok(Outcome::Error));
        assert_eq!(task.error_message().as_deref(), Some("socket closed"));
    }

    #[test]
    fn test_spawn_names_thread() {
        let config = TaskConfig {
            thread_name_prefix: "calc".into(),
            ..TaskConfig::default()
        };
        let task = Task::with_config(
            WorkFn::new("named", |_ctx: &Context| {
                Ok::<_, TaskError>(thread::current().name().map(str::to_string))
            }),
            config,
        );

        task.spawn().unwrap().join().unwrap().unwrap();
        assert_eq!(task.wait().unwrap().as_deref(), Some("calc-named"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_wait_async() {
        let task = Task::new(WorkFn::new("async", |ctx: &Context| {
            ctx.sleep(Duration::from_millis(20))?;
            Ok::<_, TaskError>("ready")
        }));
        let handle = task.spawn().unwrap();

        assert_eq!(task.wait_async().await.unwrap(), "ready");
        assert_eq!(handle.join().unwrap(), Ok(Outcome::Success));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_wait_async_timeout() {
        let (task, count) = counter("forever");
        let handle = task.spawn().unwrap();

        let err = task
            .wait_async_timeout(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, WaitError::Timeout { .. }));
        assert!(!task.is_done());
        eventually("counter running", || count.load(Ordering::SeqCst) > 0);

        task.request_cancel(true);
        assert!(matches!(task.wait_async().await, Err(WaitError::Canceled)));
        assert_eq!(handle.join().unwrap(), Ok(Outcome::Cancelled));
    }
}
