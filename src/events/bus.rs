//! # Broadcast bus for controller notifications.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that gives
//! the controller non-blocking, fire-and-forget publishing.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits.
//! - **Bounded capacity**: a single ring buffer stores recent events for
//!   all receivers; slow receivers observe `RecvError::Lagged(n)` and skip
//!   the `n` oldest items.
//! - **No persistence**: events sent while no receiver exists are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for controller notifications.
///
/// Cheap to clone (internally holds an `Arc`-backed sender). Multiple
/// publishers may publish concurrently; each receiver observes clones of
/// every event sent after it subscribed.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers the event is dropped; the call still
    /// returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver observing subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_published_after_subscribe() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::RetryScheduled)); // no receiver yet, dropped

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::PushFailed));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::PushFailed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn capacity_is_clamped() {
        // Would panic inside broadcast::channel with capacity 0.
        let _ = Bus::new(0);
    }
}
