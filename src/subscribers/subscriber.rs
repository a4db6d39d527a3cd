//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for observing a task's lifecycle.
//!
//! ## Rules
//! - Hooks run **synchronously on the task's owning thread**; a slow subscriber
//!   directly throttles the work, so keep them short and non-blocking.
//! - Events arrive in `seq` order; `on_begun` is always first and `on_ended` last.
//! - Panics are caught per call and logged; the task and other subscribers continue.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use taskgate::{Event, Subscribe};
//!
//! #[derive(Default)]
//! struct ProgressGauge {
//!     permille: AtomicU64,
//! }
//!
//! impl Subscribe for ProgressGauge {
//!     fn on_progress(&self, ev: &Event) {
//!         let p = ev.progress.unwrap_or_default();
//!         self.permille.store((p * 1000.0) as u64, Ordering::Relaxed);
//!     }
//!
//!     fn name(&self) -> &'static str { "progress-gauge" }
//! }
//! ```

use crate::events::{Event, EventKind};

/// Observer of task lifecycle events.
///
/// Every hook has an empty default; implement the ones you need.
/// [`on_event`](Subscribe::on_event) dispatches by [`EventKind`] and may be
/// overridden to handle all kinds in one place.
pub trait Subscribe: Send + Sync + 'static {
    /// The task started running.
    fn on_begun(&self, _event: &Event) {}

    /// The work posted a message.
    fn on_message(&self, _event: &Event) {}

    /// The work posted progress (already mapped into the task's endpoints).
    fn on_progress(&self, _event: &Event) {}

    /// A checkpoint is about to block on a pause request.
    fn on_paused(&self, _event: &Event) {}

    /// A paused checkpoint was released by `resume`.
    fn on_resumed(&self, _event: &Event) {}

    /// The run ended; `event.outcome` holds the final outcome.
    fn on_ended(&self, _event: &Event) {}

    /// Routes an event to the matching hook.
    fn on_event(&self, event: &Event) {
        match event.kind {
            EventKind::TaskBegun => self.on_begun(event),
            EventKind::TaskMessage => self.on_message(event),
            EventKind::TaskProgress => self.on_progress(event),
            EventKind::TaskPaused => self.on_paused(event),
            EventKind::TaskResumed => self.on_resumed(event),
            EventKind::TaskEnded => self.on_ended(event),
        }
    }

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
