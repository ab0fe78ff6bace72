//! Observer fan-out for controller notifications.
//!
//! ## Contents
//! - [`Subscribe`] the observer extension point
//! - [`SubscriberSet`] non-blocking fan-out with per-subscriber queues
//! - [`LogWriter`] stdout demo subscriber (feature `logging`)

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
