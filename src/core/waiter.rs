//! # Blocking result channel.
//!
//! Consumers park on the task's condition variable until `ended`, then resolve
//! the stored outcome:
//!
//! ```text
//! Success(v)  ──► Ok(v.clone())
//! Cancelled   ──► Err(WaitError::Canceled)
//! Failed(f)   ──► Err(WaitError::Execution { source: f.cause })
//! ```
//!
//! ## Rules
//! - `ended` is only observed together with the final outcome (same lock).
//! - Timed waits recompute the remaining time against a deadline on every wake;
//!   the condvar's own timeout result is never trusted.
//! - A timeout leaves the task untouched; it keeps running.
//! - Async waiters follow the `ended_tx` watch channel, flipped in the same
//!   critical section as `ended`.

use std::sync::{MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::core::outcome::Settled;
use crate::core::shared::{Shared, State};
use crate::error::WaitError;

impl<T> Shared<T> {
    /// Blocks until the run has ended and returns the locked state.
    pub(crate) fn wait_ended(&self) -> MutexGuard<'_, State<T>> {
        let mut state = self.lock();
        while !self.is_ended() {
            state = self.cond.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state
    }

    /// Like [`wait_ended`](Self::wait_ended), bounded by `timeout`.
    pub(crate) fn wait_ended_timeout(
        &self,
        timeout: Duration,
    ) -> Result<MutexGuard<'_, State<T>>, WaitError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Ok(self.wait_ended());
        };

        let mut state = self.lock();
        while !self.is_ended() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(WaitError::Timeout { timeout });
            }
            state = self
                .cond
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        Ok(state)
    }

    /// Completes once the run has ended.
    pub(crate) async fn ended(&self) {
        let mut rx = self.ended_tx.subscribe();
        // The borrowed value must not outlive this statement: `ended_tx` is written
        // under the state lock, which the caller takes next.
        let _ = rx.wait_for(|ended| *ended).await.map(|_| ());
    }
}

impl<T: Clone> State<T> {
    /// Resolves a finished run for a consumer.
    pub(crate) fn resolve(&self) -> Result<T, WaitError> {
        match &self.settled {
            Settled::Success(value) => Ok(value.clone()),
            Settled::Failed(failure) => Err(WaitError::Execution {
                source: failure.cause.clone(),
            }),
            // Pending cannot be observed after `ended`; treat a racing reset like cancellation.
            Settled::Cancelled | Settled::Pending => Err(WaitError::Canceled),
        }
    }
}
