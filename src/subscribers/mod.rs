//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] registry
//! every task carries, and built-in implementations.
//!
//! ## Architecture
//! ```text
//! Event flow (owning thread only):
//!   Task::run / Context ── emit(Event) ──► SubscriberSet ──► Subscribe::on_event(&Event)
//!                                                                 │
//!                                              ┌──────────┬───────┴───┬──────────┐
//!                                              ▼          ▼           ▼          ▼
//!                                          on_begun  on_message  on_progress   ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use taskgate::{Event, Outcome, Subscribe};
//!
//! struct Alert;
//!
//! impl Subscribe for Alert {
//!     fn on_ended(&self, event: &Event) {
//!         if event.outcome == Some(Outcome::Error) {
//!             // page someone
//!         }
//!     }
//! }
//! ```

mod embedded;
mod set;
mod subscriber;

pub use embedded::LogWriter;
pub(crate) use set::panic_message;
pub use set::{SubscriberId, SubscriberSet};
pub use subscriber::Subscribe;
