//! Runtime core: one task instance and its lifecycle.
//!
//! The public API from this module is [`Task`] (plus the [`Context`]/[`Reporter`]
//! handed to the work), its [`TaskConfig`] and the terminal [`Outcome`].
//!
//! Internal modules:
//! - [`task`]: the lifecycle state machine (run, reset, wait, status);
//! - [`shared`]: per-instance state, flags and locks;
//! - [`owner`]: single-owner guard for the executing thread;
//! - [`control`]: cancel/pause requests and the checkpoint;
//! - [`broadcast`]: begun/message/progress/ended events;
//! - [`waiter`]: blocking, bounded and async result retrieval;
//! - [`interrupt`]: per-thread interrupt flag behind [`Context::sleep`].

mod broadcast;
mod config;
mod context;
mod control;
mod elapsed;
mod interrupt;
mod outcome;
mod owner;
mod progress;
mod shared;
mod task;
mod waiter;

pub use config::TaskConfig;
pub use context::{Context, Reporter};
pub use interrupt::{clear_interrupt, is_interrupted};
pub use outcome::Outcome;
pub use task::Task;
