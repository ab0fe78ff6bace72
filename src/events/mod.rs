//! Notification events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to the notifications emitted by the controller.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publisher**: `RetryController`.
//! - **Consumers**: the controller's fan-out listener (delivers to
//!   [`SubscriberSet`](crate::SubscriberSet)) and any receiver obtained
//!   from [`RetryController::bus`](crate::RetryController::bus).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
