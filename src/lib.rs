//! # taskgate
//!
//! **Taskgate** wraps one long-running, blocking computation in a lifecycle
//! controller: it runs on exactly one thread at a time, can be cancelled or
//! paused from any other thread at safe points the work chooses, reports
//! messages and progress to subscribers, and hands its result to any number of
//! waiting consumers.
//!
//! ## Architecture
//! ```text
//!   controller threads             owning thread                    consumer threads
//!  ┌────────────────────┐   ┌───────────────────────────┐   ┌───────────────────────────┐
//!  │ request_cancel()   │   │ Task::run()               │   │ wait() / wait_timeout()   │
//!  │ request_pause()    │──►│   └─► Work::run(&Context) │   │ wait_async()              │
//!  │ resume()           │   │         ├─ checkpoint()   │   └─────────────▲─────────────┘
//!  │ interrupt()        │   │         ├─ post_message() │                 │
//!  └────────────────────┘   │         ├─ post_progress()│     outcome + ended (one lock)
//!                           │         └─ sleep()        │                 │
//!  ┌────────────────────┐   │   └─► settle outcome ─────┼─────────────────┘
//!  │ helper threads     │   └─────────────┬─────────────┘
//!  │ Reporter::         │                 │ Event
//!  │  finish_with_error │                 ▼
//!  └────────────────────┘   ┌───────────────────────────┐
//!                           │ SubscriberSet             │
//!                           │  ├─► LogWriter            │
//!                           │  └─► user Subscribe impls │
//!                           └───────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Task::new(work) ──► run() ──► TaskBegun ──► work ──► TaskEnded ──► wait() returns
//!                       ▲                                                 │
//!                       └──────────────────────── reset() ◄───────────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                  |
//! |-------------------|-------------------------------------------------------------|-------------------------------------|
//! | **Tasks**         | Define work as a trait impl or a closure.                   | [`Work`], [`WorkFn`], [`Task`]      |
//! | **Control**       | Cooperative cancel, pause/resume, interrupt.                | [`Task`], [`Context`]               |
//! | **Observation**   | Begun/message/progress/paused/resumed/ended events.         | [`Subscribe`], [`Event`]            |
//! | **Results**       | Blocking, bounded and async waiting on the outcome.         | [`Outcome`], [`WaitError`]          |
//! | **Errors**        | Typed errors for work, waiting and API misuse.              | [`TaskError`], [`UsageError`]       |
//! | **Configuration** | Pause polling, progress endpoints, logging, thread naming.  | [`TaskConfig`]                      |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use taskgate::{Context, LogWriter, Outcome, Task, TaskError, WorkFn};
//!
//! let task = Task::new(WorkFn::new("crunch", |ctx: &Context| {
//!     let mut acc = 0u64;
//!     for i in 1..=1_000u64 {
//!         ctx.checkpoint()?;
//!         acc += i;
//!         if i % 100 == 0 {
//!             ctx.post_progress(i as f64 / 1_000.0)?;
//!         }
//!     }
//!     Ok::<_, TaskError>(acc)
//! }));
//! task.subscribe(Arc::new(LogWriter::default()));
//!
//! let handle = task.spawn()?;
//! assert_eq!(task.wait_timeout(Duration::from_secs(5))?, 500_500);
//! assert_eq!(handle.join().expect("task thread"), Ok(Outcome::Success));
//!
//! // A finished task can be reset and run again.
//! task.reset()?;
//! assert_eq!(task.run()?, Outcome::Success);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use self::core::{Context, Outcome, Reporter, Task, TaskConfig, clear_interrupt, is_interrupted};
pub use error::{TaskError, UsageError, WaitError};
pub use events::{Event, EventKind};
pub use subscribers::{LogWriter, Subscribe, SubscriberId, SubscriberSet};
pub use tasks::{Work, WorkFn};
