//! # Per-thread interrupt status.
//!
//! Rust threads have no built-in interrupt. Every thread lazily gets an
//! [`InterruptFlag`]; the ownership guard keeps a handle to the owner's flag so
//! other threads can interrupt it (`set` + unpark). Interruptible waits inside the
//! work (see [`Context::sleep`](crate::Context::sleep)) consume the flag and fail
//! with [`TaskError::Interrupted`](crate::TaskError::Interrupted).
//!
//! ## Rules
//! - The flag is sticky until someone takes it.
//! - An interrupt caused by cancellation is cleared by the lifecycle when the run
//!   ends `Cancelled`; any other interrupt is left set for callers up the stack.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

thread_local! {
    static CURRENT: Arc<InterruptFlag> = Arc::new(InterruptFlag::default());
}

/// Interrupt status of one thread.
#[derive(Debug, Default)]
pub(crate) struct InterruptFlag {
    raised: AtomicBool,
}

impl InterruptFlag {
    #[inline]
    pub(crate) fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub(crate) fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    /// Clears the flag, returning whether it was set.
    #[inline]
    pub(crate) fn take(&self) -> bool {
        self.raised.swap(false, Ordering::SeqCst)
    }
}

/// Handle to the calling thread's flag.
pub(crate) fn current() -> Arc<InterruptFlag> {
    CURRENT.with(Arc::clone)
}

/// Returns true if the calling thread has a pending interrupt.
///
/// After [`Task::run`](crate::Task::run) returns, this reports an interrupt the
/// lifecycle re-asserted because it was not caused by cancellation.
pub fn is_interrupted() -> bool {
    CURRENT.with(|flag| flag.is_raised())
}

/// Clears the calling thread's interrupt, returning whether one was pending.
pub fn clear_interrupt() -> bool {
    CURRENT.with(|flag| flag.take())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_flag_is_per_thread() {
        current().raise();
        assert!(is_interrupted());

        let other = thread::spawn(is_interrupted).join().unwrap();
        assert!(!other);

        assert!(clear_interrupt());
        assert!(!is_interrupted());
        assert!(!clear_interrupt());
    }

    #[test]
    fn test_remote_raise_is_visible_to_owner() {
        let (tx, rx) = std::sync::mpsc::channel();
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        let worker = thread::spawn(move || {
            tx.send(current()).unwrap();
            done_rx.recv().unwrap();
            clear_interrupt()
        });

        let flag = rx.recv().unwrap();
        flag.raise();
        done_tx.send(()).unwrap();
        assert!(worker.join().unwrap());
    }
}
