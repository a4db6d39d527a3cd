//! # Function-backed work (`WorkFn`)
//!
//! [`WorkFn`] wraps a closure `F: Fn(&Context) -> Result<T, TaskError>`, invoked
//! once per run. The closure is `Fn`, not `FnMut`: a reset task runs it again, so
//! state shared between runs has to be explicit (`Arc<...>` captured by the closure).
//!
//! ## Example
//! ```rust
//! use taskgate::{Context, TaskError, Work, WorkFn};
//!
//! let w = WorkFn::new("answer", |ctx: &Context| {
//!     ctx.checkpoint()?;
//!     Ok::<_, TaskError>(42)
//! });
//!
//! assert_eq!(w.name(), "answer");
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::core::Context;
use crate::error::TaskError;
use crate::tasks::work::Work;

/// Function-backed work implementation.
pub struct WorkFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates new function-backed work.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for WorkFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkFn").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<F, T> Work for WorkFn<F>
where
    F: Fn(&Context) -> Result<T, TaskError> + Send + Sync + 'static, // Fn, not FnMut
    T: Send + 'static,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &Context) -> Result<T, TaskError> {
        (self.f)(ctx)
    }
}
