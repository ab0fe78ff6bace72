//! # Controller configuration and fixed constants.
//!
//! [`MAX_ATTEMPTS`] is fixed by design. The delay between attempts defaults
//! to [`DEFAULT_DELAY`] and is tunable per deployment through
//! [`RetryHooks::delay`](crate::RetryHooks::delay), not through config.

use std::time::Duration;

use crate::entity::ContentKind;

/// Maximum number of retry attempts per cycle. Fixed.
pub const MAX_ATTEMPTS: u32 = 3;

/// Default delay before a scheduled attempt. Overridable via
/// [`RetryHooks::delay`](crate::RetryHooks::delay).
pub const DEFAULT_DELAY: Duration = Duration::from_secs(120);

/// Configuration for a [`RetryController`](crate::RetryController).
///
/// ## Field semantics
/// - `bus_capacity`: notification bus ring buffer size (min 1; clamped)
/// - `target`: the single content kind eligible for retry cycles
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Capacity of the notification bus broadcast channel.
    ///
    /// Slow subscribers that lag behind more than this many events observe
    /// `Lagged` and skip older items. Minimum value is 1 (enforced by the
    /// bus).
    pub bus_capacity: usize,

    /// The content kind the controller acts on. Publish signals for any
    /// other kind are ignored.
    pub target: ContentKind,
}

impl ControllerConfig {
    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ControllerConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 256`
    /// - `target = ContentKind::Article`
    fn default() -> Self {
        Self {
            bus_capacity: 256,
            target: ContentKind::Article,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_clamped_to_one() {
        let cfg = ControllerConfig {
            bus_capacity: 0,
            ..ControllerConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(ControllerConfig::default().bus_capacity_clamped(), 256);
    }
}
