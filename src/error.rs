//! Error type for push attempts.
//!
//! A [`PushError`] is produced by a [`PushClient`](crate::PushClient) when a
//! single delivery attempt fails. Every variant carries a human-readable
//! message; the controller converts the error to a plain string before it
//! leaves [`run_scheduled_attempt`](crate::RetryController::run_scheduled_attempt),
//! so no error value ever propagates past the controller boundary.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by a single push attempt.
///
/// All variants are recoverable from the controller's point of view: any
/// failure drives the bounded retry loop, none is terminal on its own.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PushError {
    /// The remote service could not be reached or the connection broke.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the network-level failure.
        message: String,
    },

    /// The remote service received the item and refused it.
    #[error("remote rejected the push: {message}")]
    Rejected {
        /// Rejection reason reported by the service.
        message: String,
    },

    /// The attempt did not complete within the client's own deadline.
    #[error("push timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },
}

impl PushError {
    /// Transport failure with the given description.
    pub fn transport(message: impl Into<String>) -> Self {
        PushError::Transport {
            message: message.into(),
        }
    }

    /// Rejection with the reason reported by the remote service.
    pub fn rejected(message: impl Into<String>) -> Self {
        PushError::Rejected {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        let err = PushError::transport("connection reset by peer");
        assert_eq!(err.to_string(), "transport failure: connection reset by peer");

        let err = PushError::rejected("payload too large");
        assert_eq!(err.to_string(), "remote rejected the push: payload too large");

        let err = PushError::Timeout {
            timeout: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("30s"));
    }
}
