//! # Work abstractions.
//!
//! This module provides the user-facing side of a task:
//! - [`Work`] - trait for the computation a task runs
//! - [`WorkFn`] - closure-backed implementation

mod work;
mod work_fn;

pub use work::Work;
pub use work_fn::WorkFn;
