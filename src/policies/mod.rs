//! Pure decision points the host can override without touching the
//! controller.
//!
//! ## Contents
//! - [`RetryHooks`] the two decision points (suppress scheduling, tune delay)
//! - [`DefaultHooks`] the pass-through defaults

mod hooks;

pub use hooks::{DefaultHooks, RetryHooks};
