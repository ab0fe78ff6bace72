//! # In-process scheduler backed by Tokio timers.
//!
//! [`TokioScheduler`] keeps one spawned task per pending job. Each task
//! sleeps until the target time (cancellable), deregisters itself, then
//! runs the job body.
//!
//! ## Rules
//! - Replace semantics: inserting under an occupied key cancels the
//!   previous job's sleep.
//! - A job deregisters **before** running, so a reschedule issued from
//!   inside the job body is never clobbered by its own cleanup.
//! - Jobs registered with a target time in the past fire immediately.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use super::scheduler::{JobFuture, JobKey, Scheduler};

/// Pending-job handle: a registration number to detect replacement, and a
/// token to abort the sleep.
struct JobHandle {
    id: u64,
    token: CancellationToken,
}

/// In-process [`Scheduler`] implementation.
///
/// Suitable for single-process hosts and tests. Pending jobs do not
/// survive a process restart; hosts that need durable schedules should
/// implement [`Scheduler`] over their own job queue.
#[derive(Default)]
pub struct TokioScheduler {
    jobs: Arc<RwLock<HashMap<JobKey, JobHandle>>>,
    next_id: AtomicU64,
}

impl TokioScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs currently pending.
    pub async fn pending(&self) -> usize {
        self.jobs.read().await.len()
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn schedule(&self, key: JobKey, at: SystemTime, job: JobFuture) {
        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        let token = CancellationToken::new();

        {
            let mut jobs = self.jobs.write().await;
            if let Some(prev) = jobs.insert(
                key,
                JobHandle {
                    id,
                    token: token.clone(),
                },
            ) {
                prev.token.cancel();
            }
        }

        let jobs = Arc::clone(&self.jobs);
        tokio::spawn(async move {
            let delay = at
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO);
            let sleep = time::sleep(delay);
            tokio::pin!(sleep);

            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => return,
            }

            // Deregister before running so a reschedule from inside the
            // job body keeps its own fresh registration.
            let ours = {
                let mut map = jobs.write().await;
                match map.get(&key) {
                    Some(handle) if handle.id == id => {
                        map.remove(&key);
                        true
                    }
                    _ => false,
                }
            };

            if ours && !token.is_cancelled() {
                job.await;
            }
        });
    }

    async fn cancel(&self, key: JobKey) {
        if let Some(handle) = self.jobs.write().await.remove(&key) {
            handle.token.cancel();
        }
    }
}
