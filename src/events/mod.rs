//! Task events: the data model fired to subscribers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: the task's lifecycle, always on the owning thread.
//! - **Consumers**: [`Subscribe`](crate::Subscribe) implementations registered on the task,
//!   invoked synchronously through the task's [`SubscriberSet`](crate::SubscriberSet).

mod event;

pub use event::{Event, EventKind};
