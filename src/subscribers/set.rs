//! # SubscriberSet: synchronous fan-out over registered subscribers
//!
//! [`SubscriberSet`] delivers each [`Event`] to every registered subscriber on
//! the calling thread (the task's owner).
//!
//! ## What it guarantees
//! - `emit(&Event)` returns after every subscriber has seen the event.
//! - Panics inside subscribers are caught and logged (isolation).
//! - Subscribers may add or remove registrations from inside a hook; the change
//!   applies from the next event.
//!
//! ## What it does **not** guarantee
//! - No ordering between subscribers (the set is unordered by contract).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │         snapshot of Arc handles (lock released before delivery)
//!        ├────────► S1.on_event()   ── panic caught → warn!
//!        ├────────► S2.on_event()
//!        └────────► SN.on_event()
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::events::Event;

use super::Subscribe;

/// Handle returned by [`SubscriberSet::add`]; pass it to [`SubscriberSet::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Registry of subscribers with synchronous, panic-isolated delivery.
#[derive(Default)]
pub struct SubscriberSet {
    next_id: AtomicU64,
    entries: RwLock<Vec<(SubscriberId, Arc<dyn Subscribe>)>>,
}

impl SubscriberSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber.
    pub fn add(&self, sub: Arc<dyn Subscribe>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, sub));
        id
    }

    /// Unregisters a subscriber. Returns false if `id` was not registered.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    /// Delivers one event to all subscribers.
    pub fn emit(&self, event: &Event) {
        let subs: Vec<Arc<dyn Subscribe>> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, sub)| Arc::clone(sub))
            .collect();

        for sub in subs {
            if let Err(panic_err) = panic::catch_unwind(AssertUnwindSafe(|| sub.on_event(event))) {
                tracing::warn!(
                    subscriber = sub.name(),
                    event = event.kind.as_label(),
                    info = %panic_message(panic_err.as_ref()),
                    "subscriber panicked"
                );
            }
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Renders a panic payload (`&str` or `String`), falling back to a placeholder.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    impl Subscribe for Recorder {
        fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }
    }

    struct Exploding;

    impl Subscribe for Exploding {
        fn on_message(&self, _event: &Event) {
            panic!("listener bug");
        }

        fn name(&self) -> &'static str {
            "exploding"
        }
    }

    #[test]
    fn test_emit_reaches_all_despite_panic() {
        let set = SubscriberSet::new();
        let rec = Arc::new(Recorder::default());
        set.add(Arc::new(Exploding));
        set.add(rec.clone());

        set.emit(&Event::new(EventKind::TaskBegun, 0));
        set.emit(&Event::new(EventKind::TaskMessage, 1));

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![EventKind::TaskBegun, EventKind::TaskMessage]
        );
    }

    #[test]
    fn test_remove() {
        let set = SubscriberSet::new();
        let rec = Arc::new(Recorder::default());
        let id = set.add(rec.clone());
        assert_eq!(set.len(), 1);

        assert!(set.remove(id));
        assert!(!set.remove(id));
        assert!(set.is_empty());

        set.emit(&Event::new(EventKind::TaskBegun, 0));
        assert!(rec.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
