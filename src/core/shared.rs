//! # Per-instance task state.
//!
//! [`Shared`] is everything a task instance and its helpers see: hot-path atomic
//! flags, one mutex + condition variable for compound transitions, the ownership
//! guard and the subscriber registry.
//!
//! ```text
//!                    ┌────────────────────── Shared<T> ─────────────────────┐
//!  any thread ──►    │ begun / ended / cancel / pause   (atomics, lock-free) │
//!                    │ state: Mutex<State<T>> + cond                        │
//!                    │   settled (outcome + value/failure), pending failure │
//!                    │   progress, endpoints, cancellation token            │
//!                    │ owner: OwnerSlot          subscribers: SubscriberSet │
//!                    │ ended_tx: watch<bool>     (async waiters)            │
//!                    └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Flags are read lock-free; every write that other threads wait on happens
//!   under `state` and is followed by `cond.notify_all()`.
//! - `ended` flips to true only under `state`, in the same critical section that
//!   stores the final `settled` value and flips `ended_tx`.
//! - Lock order: `state` before the owner slot. Subscribers are never invoked
//!   with `state` held.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::core::config::TaskConfig;
use crate::core::outcome::Settled;
use crate::core::owner::OwnerSlot;
use crate::core::progress::ProgressRange;
use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::subscribers::SubscriberSet;

/// Fields guarded by the task lock.
pub(crate) struct State<T> {
    /// Outcome of the current run, with its value or failure.
    pub(crate) settled: Settled<T>,
    /// Deliberate failure recorded off the owning thread.
    pub(crate) pending: Option<TaskError>,
    /// Set by `Task::interrupt` during the current run; survives a later cancel.
    pub(crate) interrupted: bool,
    /// Last mapped progress.
    pub(crate) progress: f64,
    /// Endpoints raw progress is mapped into.
    pub(crate) range: ProgressRange,
    /// Cancelled by `request_cancel`; replaced by `reset`.
    pub(crate) token: CancellationToken,
}

pub(crate) struct Shared<T> {
    pub(crate) name: Arc<str>,
    pub(crate) config: TaskConfig,
    pub(crate) owner: OwnerSlot,
    pub(crate) subscribers: SubscriberSet,

    state: Mutex<State<T>>,
    pub(crate) cond: Condvar,

    begun: AtomicBool,
    ended: AtomicBool,
    pub(crate) cancel: AtomicBool,
    pub(crate) pause: AtomicBool,

    seq: AtomicU64,
    pub(crate) ended_tx: watch::Sender<bool>,
}

impl<T> Shared<T> {
    pub(crate) fn new(name: Arc<str>, config: TaskConfig) -> Self {
        let range = ProgressRange::new(config.progress_begin, config.progress_end)
            .unwrap_or_else(|err| {
                tracing::warn!(task = %name, error = %err, "ignoring configured progress endpoints");
                ProgressRange::default()
            });
        let (ended_tx, _) = watch::channel(false);

        Self {
            name,
            config,
            owner: OwnerSlot::default(),
            subscribers: SubscriberSet::new(),
            state: Mutex::new(State {
                settled: Settled::default(),
                pending: None,
                interrupted: false,
                progress: 0.0,
                range,
                token: CancellationToken::new(),
            }),
            cond: Condvar::new(),
            begun: AtomicBool::new(false),
            ended: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
            pause: AtomicBool::new(false),
            seq: AtomicU64::new(0),
            ended_tx,
        }
    }

    /// Locks the task state. A panic never leaves it half-written, so poison is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub(crate) fn is_begun(&self) -> bool {
        self.begun.load(Ordering::SeqCst)
    }

    #[inline]
    pub(crate) fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    #[inline]
    pub(crate) fn is_paused(&self) -> bool {
        self.pause.load(Ordering::SeqCst)
    }

    /// Between begun and ended: the window in which checkpoints and reports act.
    #[inline]
    pub(crate) fn in_window(&self) -> bool {
        self.is_begun() && !self.is_ended()
    }

    pub(crate) fn set_begun(&self, value: bool) {
        self.begun.store(value, Ordering::SeqCst);
    }

    /// Flips `ended`, requiring the caller to hold the state lock.
    ///
    /// Returns true if this call performed the transition.
    pub(crate) fn mark_ended(&self, _held: &MutexGuard<'_, State<T>>) -> bool {
        if self.ended.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.ended_tx.send_replace(true);
        self.cond.notify_all();
        true
    }

    /// Clears `ended`, requiring the caller to hold the state lock.
    pub(crate) fn clear_ended(&self, _held: &MutexGuard<'_, State<T>>) {
        self.ended.store(false, Ordering::SeqCst);
        self.ended_tx.send_replace(false);
    }

    /// Builds an event of `kind` stamped with this task's name and next sequence number.
    pub(crate) fn event(&self, kind: EventKind) -> Event {
        Event::new(kind, self.seq.fetch_add(1, Ordering::Relaxed)).with_task(Arc::clone(&self.name))
    }
}
