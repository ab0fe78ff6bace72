//! # Notification subscriber trait.
//!
//! [`Subscribe`] is the extension point for observers of the retry
//! notification contract (alerting, metrics, audit trails).
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported to stderr)
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the event **for this subscriber only**; other
//!   subscribers are unaffected.
//! - Events are processed sequentially (FIFO) per subscriber.
//! - Subscribers never block the controller.

use async_trait::async_trait;

use crate::events::Event;

/// Observer of controller notifications.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - The controller does not depend on anything a subscriber returns.
///
/// ## Example
/// ```
/// use async_trait::async_trait;
/// use repush::{Event, EventKind, Subscribe};
///
/// struct Alerting;
///
/// #[async_trait]
/// impl Subscribe for Alerting {
///     async fn on_event(&self, event: &Event) {
///         if matches!(event.kind, EventKind::RetriesExhausted) {
///             // page someone
///         }
///     }
///
///     fn name(&self) -> &'static str {
///         "alerting"
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single notification.
    ///
    /// Called from a dedicated worker task, never in the publisher's
    /// context. Events arrive in FIFO order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in overflow/panic warnings.
    ///
    /// Prefer short, descriptive names. The default uses
    /// `type_name::<Self>()`, which can be verbose; override it when
    /// possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity for this subscriber (clamped to min 1).
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
