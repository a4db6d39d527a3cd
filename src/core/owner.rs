//! # Ownership guard.
//!
//! At most one thread executes a task instance at a time. [`OwnerSlot`] records
//! the identity of that thread (its id, an unpark handle and its interrupt flag);
//! it never owns the thread itself.
//!
//! ```text
//! acquire():  [None] ──► [Some(current)]     // Some(_) ──► Err(AlreadyRunning)
//! release():  [Some(current)] ──► [None]     // other threads: no-op
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, Thread, ThreadId};

use crate::core::interrupt::{self, InterruptFlag};
use crate::error::UsageError;

struct Owner {
    id: ThreadId,
    thread: Thread,
    interrupt: Arc<InterruptFlag>,
}

/// Slot holding the current owner, if any.
#[derive(Default)]
pub(crate) struct OwnerSlot {
    current: Mutex<Option<Owner>>,
}

impl OwnerSlot {
    fn lock(&self) -> MutexGuard<'_, Option<Owner>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the calling thread as owner; rejects if another owner is present.
    pub(crate) fn acquire(&self) -> Result<(), UsageError> {
        let mut slot = self.lock();
        if slot.is_some() {
            return Err(UsageError::AlreadyRunning);
        }
        let thread = thread::current();
        *slot = Some(Owner {
            id: thread.id(),
            thread,
            interrupt: interrupt::current(),
        });
        Ok(())
    }

    /// Clears ownership if the calling thread holds it.
    pub(crate) fn release(&self) -> bool {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(owner) if owner.id == thread::current().id() => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// True if the calling thread is the owner.
    pub(crate) fn is_current(&self) -> bool {
        let me = thread::current().id();
        self.lock().as_ref().is_some_and(|owner| owner.id == me)
    }

    /// True if any thread owns the task.
    pub(crate) fn is_held(&self) -> bool {
        self.lock().is_some()
    }

    /// Raises the owner's interrupt flag and unparks it. Returns false when idle.
    pub(crate) fn interrupt(&self) -> bool {
        match self.lock().as_ref() {
            Some(owner) => {
                owner.interrupt.raise();
                owner.thread.unpark();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_second_acquire_is_rejected() {
        let slot = Arc::new(OwnerSlot::default());
        slot.acquire().unwrap();
        assert!(slot.is_current());

        let remote = Arc::clone(&slot);
        let res = thread::spawn(move || remote.acquire()).join().unwrap();
        assert_eq!(res, Err(UsageError::AlreadyRunning));

        // Same thread cannot re-enter either.
        assert_eq!(slot.acquire(), Err(UsageError::AlreadyRunning));
        assert!(slot.release());
        assert!(!slot.is_held());
    }

    #[test]
    fn test_release_from_non_owner_is_ignored() {
        let slot = Arc::new(OwnerSlot::default());
        slot.acquire().unwrap();

        let remote = Arc::clone(&slot);
        let released = thread::spawn(move || remote.release()).join().unwrap();
        assert!(!released);
        assert!(slot.is_held());
        assert!(slot.release());
    }

    #[test]
    fn test_interrupt_reaches_owner_thread() {
        let slot = Arc::new(OwnerSlot::default());
        assert!(!slot.interrupt());

        let (ready_tx, ready_rx) = mpsc::channel();
        let (go_tx, go_rx) = mpsc::channel::<()>();
        let owner_slot = Arc::clone(&slot);
        let owner = thread::spawn(move || {
            owner_slot.acquire().unwrap();
            ready_tx.send(()).unwrap();
            go_rx.recv().unwrap();
            let seen = interrupt::clear_interrupt();
            owner_slot.release();
            seen
        });

        ready_rx.recv().unwrap();
        assert!(slot.interrupt());
        go_tx.send(()).unwrap();
        assert!(owner.join().unwrap());
    }
}
