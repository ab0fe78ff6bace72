//! # Notifications emitted by the retry controller.
//!
//! The [`EventKind`] enum classifies the notification contract:
//! - **Scheduling**: a future attempt was armed ([`EventKind::RetryScheduled`])
//! - **Outcomes**: one attempt succeeded or failed
//!   ([`EventKind::PushSucceeded`], [`EventKind::PushFailed`])
//! - **Terminal**: the cycle gave up ([`EventKind::RetriesExhausted`])
//!
//! The [`Event`] struct carries the metadata observers need: entity id,
//! attempt number, failure reason, result share URL, scheduled delay.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! observed out of order.
//!
//! ## Example
//! ```rust
//! use repush::{EntityId, Event, EventKind};
//!
//! let ev = Event::new(EventKind::PushFailed)
//!     .with_entity(EntityId(7))
//!     .with_reason("transport failure: connection refused")
//!     .with_attempt(2);
//!
//! assert_eq!(ev.kind, EventKind::PushFailed);
//! assert_eq!(ev.attempt, Some(2));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::entity::EntityId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of controller notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A future attempt was registered with the scheduler.
    ///
    /// Sets:
    /// - `entity`: content item id
    /// - `delay_ms`: delay until the attempt fires
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RetryScheduled,

    /// A scheduled attempt pushed the item successfully.
    ///
    /// Sets:
    /// - `entity`: content item id
    /// - `attempt`: attempt number (1-based)
    /// - `share_url`: result metadata from the remote service, if present
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PushSucceeded,

    /// A scheduled attempt failed.
    ///
    /// Sets:
    /// - `entity`: content item id
    /// - `attempt`: attempt number (1-based)
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PushFailed,

    /// The final attempt failed and the cycle ended without success.
    ///
    /// Emitted once, immediately after the last `PushFailed`. Observers
    /// that need a hard "gave up" signal should watch for this kind.
    ///
    /// Sets:
    /// - `entity`: content item id
    /// - `attempt`: the final attempt number
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RetriesExhausted,
}

/// Controller notification with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Content item the notification refers to.
    pub entity: Option<EntityId>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u32>,
    /// Scheduled delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable failure reason.
    pub reason: Option<Arc<str>>,
    /// Share URL produced by a successful push.
    pub share_url: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            entity: None,
            attempt: None,
            delay_ms: None,
            reason: None,
            share_url: None,
        }
    }

    /// Attaches the entity id.
    #[inline]
    pub fn with_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a scheduled delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable failure reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the share URL produced by a successful push.
    #[inline]
    pub fn with_share_url(mut self, url: impl Into<Arc<str>>) -> Self {
        self.share_url = Some(url.into());
        self
    }
}
