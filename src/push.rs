//! # One-shot delivery client.
//!
//! [`PushClient`] is the seam to the remote content-distribution service.
//! One call is exactly one delivery attempt; the retry loop lives entirely
//! in the controller.

use async_trait::async_trait;

use crate::entity::EntityId;
use crate::error::PushError;

/// Performs a single push of an entity to the remote service.
///
/// ### Implementation requirements
/// - Exactly one delivery attempt per call; no internal retries.
/// - Surface failures as a [`PushError`] with a human-readable message.
/// - The call may block on network latency; callers tolerate that.
#[async_trait]
pub trait PushClient: Send + Sync + 'static {
    /// Submits `entity` to the remote service once.
    async fn push(&self, entity: EntityId) -> Result<(), PushError>;
}

/// Outcome of one push attempt, as reported to callers of
/// [`push_now`](crate::RetryController::push_now).
///
/// Transient: never persisted, never sent over the bus as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Failure description when `success` is false.
    pub error: Option<String>,
}

impl PushOutcome {
    /// Successful attempt.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed attempt with the given description.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_constructors() {
        assert_eq!(
            PushOutcome::ok(),
            PushOutcome {
                success: true,
                error: None
            }
        );
        let failed = PushOutcome::failed("boom");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
