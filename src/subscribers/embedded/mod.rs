//! # Built-in subscribers
//!
//! Small, self-contained implementations useful for demos and debugging.
//!
//! - [`LogWriter`]: renders events through `tracing`.

mod log;

pub use log::LogWriter;
