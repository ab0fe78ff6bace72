//! # Extensibility hooks.
//!
//! [`RetryHooks`] collects the two pure decision points the controller
//! consults. Both receive the default decision and return the value to use;
//! the controller applies whatever comes back without further validation.
//!
//! ## Rules
//! - Hooks are decisions, not actions: implementations must not have side
//!   effects the controller depends on.
//! - The controller does not interpret *why* scheduling was suppressed or a
//!   delay changed.

use std::time::Duration;

use crate::entity::EntityId;

/// Decision points applied before scheduling.
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use repush::{EntityId, RetryHooks};
///
/// /// Skips retry cycles for legacy ids and retries faster in staging.
/// struct Staging;
///
/// impl RetryHooks for Staging {
///     fn should_schedule(&self, default: bool, entity: EntityId) -> bool {
///         default && entity.0 >= 1000
///     }
///
///     fn delay(&self, _default: Duration) -> Duration {
///         Duration::from_secs(5)
///     }
/// }
/// ```
pub trait RetryHooks: Send + Sync + 'static {
    /// Whether a qualifying publish event should start a retry cycle.
    ///
    /// `default` is always `true` when the controller calls this; it is
    /// passed through so implementations can chain decisions.
    fn should_schedule(&self, default: bool, entity: EntityId) -> bool {
        let _ = entity;
        default
    }

    /// Delay to wait before the next scheduled attempt.
    ///
    /// `default` is [`DEFAULT_DELAY`](crate::DEFAULT_DELAY).
    fn delay(&self, default: Duration) -> Duration {
        default
    }
}

/// Pass-through implementation: schedule whenever asked, default delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl RetryHooks for DefaultHooks {}
