//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints notifications to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [scheduled] entity=7 delay=120000ms
//! [push-failed] entity=7 attempt=1 err="transport failure: connection refused"
//! [push-ok] entity=7 attempt=3 share="https://dist.example/a/7"
//! [exhausted] entity=7 attempts=3
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use;
/// implement a custom [`Subscribe`] for structured logging or metrics.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        let entity = event.entity.map(|e| e.0).unwrap_or(0);
        match event.kind {
            EventKind::RetryScheduled => {
                println!(
                    "[scheduled] entity={entity} delay={}ms",
                    event.delay_ms.unwrap_or(0)
                );
            }
            EventKind::PushSucceeded => {
                println!(
                    "[push-ok] entity={entity} attempt={:?} share={:?}",
                    event.attempt, event.share_url
                );
            }
            EventKind::PushFailed => {
                println!(
                    "[push-failed] entity={entity} attempt={:?} err={:?}",
                    event.attempt, event.reason
                );
            }
            EventKind::RetriesExhausted => {
                println!("[exhausted] entity={entity} attempts={:?}", event.attempt);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
