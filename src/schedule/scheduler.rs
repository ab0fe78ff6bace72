//! # Scheduler seam.
//!
//! [`Scheduler`] abstracts the host's delayed-execution facility (a timer
//! wheel, a deferred job queue, a cron table). The controller registers one
//! future invocation per entity and cancels it by the same key.
//!
//! ## Contract
//! - **Replace, never add**: registering a job under a key that already has
//!   a pending job replaces it. At most one pending job exists per key.
//! - **Exactly once, best-effort**: each registered instance runs at most
//!   once, possibly later than `at`, never earlier.
//! - **Cancel is idempotent**: cancelling a key with nothing pending is a
//!   no-op.
//! - Cancellation only prevents a future firing; it does not interrupt a
//!   job that already started.

use std::future::Future;
use std::pin::Pin;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::entity::EntityId;

/// Boxed job body handed to the scheduler.
pub type JobFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Identity of a scheduled job: a fixed callback name plus its bound
/// entity argument. Registration and cancellation both match on the full
/// key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobKey {
    /// Stable callback identifier.
    pub callback: &'static str,
    /// Entity the callback is bound to.
    pub entity: EntityId,
}

impl JobKey {
    /// Creates a key for `callback` bound to `entity`.
    pub fn new(callback: &'static str, entity: EntityId) -> Self {
        Self { callback, entity }
    }
}

/// Delayed one-shot execution facility.
#[async_trait]
pub trait Scheduler: Send + Sync + 'static {
    /// Registers `job` to run once at `at`, replacing any pending job with
    /// the same key.
    async fn schedule(&self, key: JobKey, at: SystemTime, job: JobFuture);

    /// Cancels the pending job with this key, if any.
    async fn cancel(&self, key: JobKey);
}
