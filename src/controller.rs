//! # RetryController: the attempt/scheduling state machine.
//!
//! Owns the full lifecycle of a retry cycle:
//! ```text
//! host publish signal ──► on_entity_published()
//!                            ├─► qualify (status/kind/autosave/revision)
//!                            ├─► clear_cycle()           (idempotent)
//!                            ├─► hooks.should_schedule()
//!                            └─► schedule_attempt() ──► Scheduler
//!
//! delay elapses ──► run_scheduled_attempt()
//!                     ├─► stale guard: already published remotely?
//!                     │     └─► clear_cycle(), return (no push, no events)
//!                     ├─► push_now() ──► PushClient (one attempt)
//!                     ├─► Ok  ──► publish PushSucceeded, clear_cycle()
//!                     └─► Err ──► publish PushFailed
//!                           ├─► attempt < MAX_ATTEMPTS → persist attempt+1,
//!                           │                            schedule_attempt()
//!                           └─► attempt == MAX_ATTEMPTS → publish
//!                                 RetriesExhausted, clear retry record
//!
//! external success signal ──► on_push_succeeded() ──► clear_cycle()
//! ```
//!
//! ## Rules
//! - At most one pending scheduled invocation per entity (the scheduler
//!   replaces by key; a new cycle always clears the old one first).
//! - The attempt counter never exceeds [`MAX_ATTEMPTS`]; after the final
//!   failure nothing further is scheduled.
//! - Every entry point is total: push failures become failure
//!   notifications, never errors propagating to the caller.
//! - Operations for one entity are short and non-reentrant by convention;
//!   no global lock is assumed.

use std::sync::{Arc, Weak};
use std::time::SystemTime;

use crate::config::{ControllerConfig, DEFAULT_DELAY, MAX_ATTEMPTS};
use crate::entity::{EntityId, EntityState};
use crate::events::{Bus, Event, EventKind};
use crate::policies::{DefaultHooks, RetryHooks};
use crate::push::{PushClient, PushOutcome};
use crate::schedule::{JobFuture, JobKey, Scheduler};
use crate::state::{self, meta, RetryState};
use crate::store::MetadataStore;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Coordinates retry cycles for content pushes.
///
/// Construct via [`RetryController::builder`]. All collaborators are
/// injected; the controller itself holds no entity state in memory, only
/// what the [`MetadataStore`] persists.
pub struct RetryController {
    cfg: ControllerConfig,
    store: Arc<dyn MetadataStore>,
    client: Arc<dyn PushClient>,
    scheduler: Arc<dyn Scheduler>,
    hooks: Arc<dyn RetryHooks>,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    // Self-handle for minting scheduled job futures; upgrading always
    // succeeds while the controller is alive.
    weak: Weak<RetryController>,
}

impl RetryController {
    /// Fixed callback identifier under which scheduled attempts register.
    ///
    /// Paired with the entity id this forms the [`JobKey`] used for both
    /// registration and cancellation.
    pub const CALLBACK: &'static str = "repush_retry";

    /// Starts building a controller around the given collaborators.
    pub fn builder(
        cfg: ControllerConfig,
        store: Arc<dyn MetadataStore>,
        client: Arc<dyn PushClient>,
        scheduler: Arc<dyn Scheduler>,
    ) -> ControllerBuilder {
        ControllerBuilder {
            cfg,
            store,
            client,
            scheduler,
            hooks: Arc::new(DefaultHooks),
            subscribers: Vec::new(),
        }
    }

    /// Returns the notification bus.
    ///
    /// Hosts that want raw events (instead of a [`Subscribe`] worker) can
    /// call `bus().subscribe()` and read the broadcast receiver directly.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Entry point for the host's "entity was published" signal.
    ///
    /// Call only for genuine transitions into a published status; autosave
    /// and revision signals are filtered here as well, so over-delivery by
    /// the host is harmless. Non-qualifying signals have no side effects.
    ///
    /// A qualifying signal unconditionally ends any previous cycle for the
    /// entity, then consults [`RetryHooks::should_schedule`] before arming
    /// the first attempt.
    pub async fn on_entity_published(&self, entity: EntityId, state: &EntityState) {
        if !state.qualifies(self.cfg.target) {
            return;
        }

        self.clear_cycle(entity).await;

        if self.hooks.should_schedule(true, entity) {
            self.schedule_attempt(entity).await;
        }
    }

    /// Entry point for the host's "push succeeded elsewhere" signal.
    ///
    /// Ends the cycle so no stale scheduled retry fires after a success
    /// that happened outside this controller's own loop.
    pub async fn on_push_succeeded(&self, entity: EntityId) {
        self.clear_cycle(entity).await;
    }

    /// Runs one scheduled attempt. Invoked by the scheduler when the delay
    /// elapses; public so host-side schedulers can dispatch into it.
    ///
    /// Returns a boxed future (rather than being declared `async fn`) to
    /// avoid an opaque-type cycle with [`Self::schedule_attempt`], which
    /// boxes a future that calls back into this method.
    pub fn run_scheduled_attempt(
        &self,
        entity: EntityId,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            // Stale-schedule guard: published through another path while this
            // invocation was pending.
            if state::remote_already_published(self.store.as_ref(), entity).await {
                self.clear_cycle(entity).await;
                return;
            }

            let recorded = RetryState::load(self.store.as_ref(), entity).await.attempts;
            let attempt = recorded.max(1);

            let outcome = self.push_now(entity).await;

            if outcome.success {
                let share = self.store.get(entity, meta::REMOTE_SHARE_URL).await;
                let mut ev = Event::new(EventKind::PushSucceeded)
                    .with_entity(entity)
                    .with_attempt(attempt);
                if let Some(url) = share {
                    ev = ev.with_share_url(url);
                }
                self.bus.publish(ev);
                self.clear_cycle(entity).await;
                return;
            }

            let reason = outcome
                .error
                .unwrap_or_else(|| "push failed".to_string());
            self.bus.publish(
                Event::new(EventKind::PushFailed)
                    .with_entity(entity)
                    .with_attempt(attempt)
                    .with_reason(reason),
            );

            if attempt < MAX_ATTEMPTS {
                RetryState::persist_attempts(self.store.as_ref(), entity, attempt + 1).await;
                self.schedule_attempt(entity).await;
            } else {
                self.bus.publish(
                    Event::new(EventKind::RetriesExhausted)
                        .with_entity(entity)
                        .with_attempt(attempt),
                );
                RetryState::clear(self.store.as_ref(), entity).await;
            }
        })
    }

    /// Performs one push attempt right now and reports the outcome.
    ///
    /// On success the cycle is cleared here as well, so a direct push from
    /// outside the retry loop still tidies up any pending retry state.
    /// Emits no notifications; those belong to scheduled attempts.
    pub async fn push_now(&self, entity: EntityId) -> PushOutcome {
        match self.client.push(entity).await {
            Ok(()) => {
                self.clear_cycle(entity).await;
                PushOutcome::ok()
            }
            Err(err) => PushOutcome::failed(err.to_string()),
        }
    }

    /// Ends any active cycle for `entity`: cancels the pending scheduled
    /// invocation and deletes the retry record.
    ///
    /// Idempotent and safe with no active cycle. A nil entity id is a
    /// no-op.
    pub async fn clear_cycle(&self, entity: EntityId) {
        if entity.is_nil() {
            return;
        }
        self.scheduler
            .cancel(JobKey::new(Self::CALLBACK, entity))
            .await;
        RetryState::clear(self.store.as_ref(), entity).await;
    }

    /// Arms the next attempt for `entity`.
    ///
    /// The delay comes from [`RetryHooks::delay`] (default
    /// [`DEFAULT_DELAY`]). The target time is persisted as informational
    /// bookkeeping; the scheduler remains authoritative.
    pub async fn schedule_attempt(&self, entity: EntityId) {
        let Some(me) = self.weak.upgrade() else {
            return;
        };

        let delay = self.hooks.delay(DEFAULT_DELAY);
        let at = SystemTime::now() + delay;

        let job: JobFuture = Box::pin(async move {
            me.run_scheduled_attempt(entity).await;
        });
        self.scheduler
            .schedule(JobKey::new(Self::CALLBACK, entity), at, job)
            .await;

        RetryState::persist_next_at(self.store.as_ref(), entity, at).await;
        self.bus.publish(
            Event::new(EventKind::RetryScheduled)
                .with_entity(entity)
                .with_delay(delay),
        );
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn spawn_fanout(&self) {
        if self.subs.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev);
            }
        });
    }
}

/// Builder for constructing a [`RetryController`].
pub struct ControllerBuilder {
    cfg: ControllerConfig,
    store: Arc<dyn MetadataStore>,
    client: Arc<dyn PushClient>,
    scheduler: Arc<dyn Scheduler>,
    hooks: Arc<dyn RetryHooks>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ControllerBuilder {
    /// Replaces the default pass-through hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn RetryHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets notification subscribers.
    ///
    /// Each subscriber gets a dedicated worker with a bounded queue; see
    /// [`SubscriberSet`].
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the controller and spawns the notification fan-out.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Arc<RetryController> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers));

        let controller = Arc::new_cyclic(|weak| RetryController {
            cfg: self.cfg,
            store: self.store,
            client: self.client,
            scheduler: self.scheduler,
            hooks: self.hooks,
            bus,
            subs,
            weak: weak.clone(),
        });

        controller.spawn_fanout();
        controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ContentKind, EntityStatus};
    use crate::error::PushError;
    use crate::store::MemoryStore;

    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
    use std::time::Duration;
    use tokio::sync::{broadcast, Mutex};

    /// Push client that replays a scripted sequence of outcomes.
    struct ScriptedClient {
        outcomes: Mutex<VecDeque<Result<(), PushError>>>,
        calls: AtomicU32,
    }

    impl ScriptedClient {
        fn new(outcomes: Vec<Result<(), PushError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(AtomicOrdering::SeqCst)
        }
    }

    #[async_trait]
    impl PushClient for ScriptedClient {
        async fn push(&self, _entity: EntityId) -> Result<(), PushError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            self.outcomes.lock().await.pop_front().unwrap_or(Ok(()))
        }
    }

    /// Scheduler that records jobs and lets tests fire them by hand.
    #[derive(Default)]
    struct TestScheduler {
        jobs: Mutex<HashMap<JobKey, (SystemTime, JobFuture)>>,
        cancels: AtomicU32,
    }

    impl TestScheduler {
        async fn take(&self, key: JobKey) -> Option<JobFuture> {
            self.jobs.lock().await.remove(&key).map(|(_, job)| job)
        }

        async fn pending(&self) -> usize {
            self.jobs.lock().await.len()
        }
    }

    #[async_trait]
    impl Scheduler for TestScheduler {
        async fn schedule(&self, key: JobKey, at: SystemTime, job: JobFuture) {
            self.jobs.lock().await.insert(key, (at, job));
        }

        async fn cancel(&self, key: JobKey) {
            if self.jobs.lock().await.remove(&key).is_some() {
                self.cancels.fetch_add(1, AtomicOrdering::SeqCst);
            }
        }
    }

    struct Harness {
        controller: Arc<RetryController>,
        store: Arc<MemoryStore>,
        scheduler: Arc<TestScheduler>,
        client: Arc<ScriptedClient>,
        rx: broadcast::Receiver<Event>,
    }

    impl Harness {
        fn with_hooks(
            hooks: Arc<dyn RetryHooks>,
            outcomes: Vec<Result<(), PushError>>,
        ) -> Self {
            let store = Arc::new(MemoryStore::new());
            let scheduler = Arc::new(TestScheduler::default());
            let client = Arc::new(ScriptedClient::new(outcomes));

            let controller = RetryController::builder(
                ControllerConfig::default(),
                store.clone(),
                client.clone(),
                scheduler.clone(),
            )
            .with_hooks(hooks)
            .build();

            let rx = controller.bus().subscribe();
            Self {
                controller,
                store,
                scheduler,
                client,
                rx,
            }
        }

        fn new(outcomes: Vec<Result<(), PushError>>) -> Self {
            Self::with_hooks(Arc::new(DefaultHooks), outcomes)
        }

        /// Runs the pending scheduled job for `entity`, as the scheduler
        /// would when the delay elapses.
        async fn fire(&self, entity: EntityId) {
            let key = JobKey::new(RetryController::CALLBACK, entity);
            let job = self.scheduler.take(key).await.expect("no pending job");
            job.await;
        }

        fn drain(&mut self) -> Vec<Event> {
            let mut out = Vec::new();
            while let Ok(ev) = self.rx.try_recv() {
                out.push(ev);
            }
            out
        }
    }

    fn published() -> EntityState {
        EntityState::published(ContentKind::Article)
    }

    fn attempts_of(events: &[Event], kind: EventKind) -> Vec<u32> {
        events
            .iter()
            .filter(|e| e.kind == kind)
            .filter_map(|e| e.attempt)
            .collect()
    }

    #[tokio::test]
    async fn qualifying_publish_arms_one_attempt_without_attempt_meta() {
        let mut h = Harness::new(vec![]);
        let entity = EntityId(7);

        h.controller.on_entity_published(entity, &published()).await;

        assert_eq!(h.scheduler.pending().await, 1);
        assert!(h.store.get(entity, meta::ATTEMPTS).await.is_none());
        assert!(h.store.get(entity, meta::NEXT_SCHEDULED).await.is_some());

        let events = h.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::RetryScheduled);
        assert_eq!(events[0].entity, Some(entity));
        assert_eq!(events[0].delay_ms, Some(120_000));
    }

    #[tokio::test]
    async fn republish_replaces_pending_invocation() {
        let h = Harness::new(vec![]);
        let entity = EntityId(7);

        h.controller.on_entity_published(entity, &published()).await;
        h.controller.on_entity_published(entity, &published()).await;

        assert_eq!(h.scheduler.pending().await, 1);
    }

    // Scenario A: two failures, then success on the third attempt.
    #[tokio::test]
    async fn fails_twice_then_succeeds_on_third_attempt() {
        let mut h = Harness::new(vec![
            Err(PushError::transport("connection reset by peer")),
            Err(PushError::rejected("payload too large")),
            Ok(()),
        ]);
        let entity = EntityId(7);
        h.store
            .set(entity, meta::REMOTE_SHARE_URL, "https://dist.example/a/7".into())
            .await;

        h.controller.on_entity_published(entity, &published()).await;
        h.fire(entity).await;
        assert_eq!(h.store.get(entity, meta::ATTEMPTS).await.as_deref(), Some("2"));
        h.fire(entity).await;
        assert_eq!(h.store.get(entity, meta::ATTEMPTS).await.as_deref(), Some("3"));
        h.fire(entity).await;

        let events = h.drain();
        assert_eq!(attempts_of(&events, EventKind::PushFailed), vec![1, 2]);
        assert_eq!(attempts_of(&events, EventKind::PushSucceeded), vec![3]);
        assert_eq!(attempts_of(&events, EventKind::RetriesExhausted), Vec::<u32>::new());

        let success = events
            .iter()
            .find(|e| e.kind == EventKind::PushSucceeded)
            .unwrap();
        assert_eq!(success.share_url.as_deref(), Some("https://dist.example/a/7"));

        let failure = events
            .iter()
            .find(|e| e.kind == EventKind::PushFailed)
            .unwrap();
        assert_eq!(
            failure.reason.as_deref(),
            Some("transport failure: connection reset by peer")
        );

        assert_eq!(h.client.calls(), 3);
        assert_eq!(h.scheduler.pending().await, 0);
        assert!(h.store.get(entity, meta::ATTEMPTS).await.is_none());
        assert!(h.store.get(entity, meta::NEXT_SCHEDULED).await.is_none());
    }

    // Scenario B: three consecutive failures exhaust the cycle.
    #[tokio::test]
    async fn three_failures_exhaust_without_fourth_schedule() {
        let mut h = Harness::new(vec![
            Err(PushError::transport("timeout")),
            Err(PushError::transport("timeout")),
            Err(PushError::transport("timeout")),
        ]);
        let entity = EntityId(7);

        h.controller.on_entity_published(entity, &published()).await;
        h.fire(entity).await;
        h.fire(entity).await;
        h.fire(entity).await;

        let events = h.drain();
        assert_eq!(attempts_of(&events, EventKind::PushFailed), vec![1, 2, 3]);
        assert!(attempts_of(&events, EventKind::PushSucceeded).is_empty());
        assert_eq!(attempts_of(&events, EventKind::RetriesExhausted), vec![3]);

        // The exhausted notification follows the final failure.
        let last_two: Vec<EventKind> = events.iter().rev().take(2).map(|e| e.kind).collect();
        assert_eq!(last_two, vec![EventKind::RetriesExhausted, EventKind::PushFailed]);

        assert_eq!(h.client.calls(), 3);
        assert_eq!(h.scheduler.pending().await, 0);
        assert!(h.store.get(entity, meta::ATTEMPTS).await.is_none());
        assert!(h.store.get(entity, meta::NEXT_SCHEDULED).await.is_none());
    }

    // Scenario C: external success cancels; a stale firing is inert.
    #[tokio::test]
    async fn external_success_clears_and_stale_firing_is_inert() {
        let mut h = Harness::new(vec![]);
        let entity = EntityId(7);

        h.controller.on_entity_published(entity, &published()).await;
        assert_eq!(h.scheduler.pending().await, 1);

        h.controller.on_push_succeeded(entity).await;
        assert_eq!(h.scheduler.pending().await, 0);
        assert!(h.store.get(entity, meta::NEXT_SCHEDULED).await.is_none());

        // The remote copy now exists and is settled.
        h.store.set(entity, meta::REMOTE_ID, "an-123".into()).await;
        h.drain();

        // A firing that escaped cancellation observes the remote state and
        // does nothing.
        h.controller.run_scheduled_attempt(entity).await;

        assert_eq!(h.client.calls(), 0);
        assert!(h.drain().is_empty());
        assert!(h.store.get(entity, meta::ATTEMPTS).await.is_none());
    }

    // Scenario D: the should-schedule hook suppresses the cycle.
    #[tokio::test]
    async fn should_schedule_hook_suppresses_cycle() {
        struct Suppress;
        impl RetryHooks for Suppress {
            fn should_schedule(&self, _default: bool, _entity: EntityId) -> bool {
                false
            }
        }

        let mut h = Harness::with_hooks(Arc::new(Suppress), vec![]);
        let entity = EntityId(7);

        h.controller.on_entity_published(entity, &published()).await;

        assert_eq!(h.scheduler.pending().await, 0);
        assert!(h.store.is_empty().await);
        assert!(h.drain().is_empty());
    }

    // Scenario E: autosaves, revisions, and non-qualifying states are ignored.
    #[tokio::test]
    async fn non_qualifying_signals_have_no_side_effects() {
        let mut h = Harness::new(vec![]);
        let entity = EntityId(7);

        let autosave = EntityState {
            autosave: true,
            ..published()
        };
        let revision = EntityState {
            revision: true,
            ..published()
        };
        let draft = EntityState {
            status: EntityStatus::Draft,
            ..published()
        };
        let page = EntityState::published(ContentKind::Page);

        for state in [autosave, revision, draft, page] {
            h.controller.on_entity_published(entity, &state).await;
        }

        assert_eq!(h.scheduler.pending().await, 0);
        assert!(h.store.is_empty().await);
        assert!(h.drain().is_empty());
    }

    #[tokio::test]
    async fn delay_hook_overrides_default() {
        struct FastRetry;
        impl RetryHooks for FastRetry {
            fn delay(&self, _default: Duration) -> Duration {
                Duration::from_secs(5)
            }
        }

        let mut h = Harness::with_hooks(Arc::new(FastRetry), vec![]);
        let entity = EntityId(7);

        h.controller.on_entity_published(entity, &published()).await;

        let events = h.drain();
        assert_eq!(events[0].delay_ms, Some(5_000));
    }

    #[tokio::test]
    async fn clear_cycle_is_idempotent_and_tolerates_nil_id() {
        let h = Harness::new(vec![]);
        let entity = EntityId(7);

        h.controller.on_entity_published(entity, &published()).await;

        h.controller.clear_cycle(entity).await;
        h.controller.clear_cycle(entity).await;
        h.controller.clear_cycle(EntityId(0)).await;

        assert_eq!(h.scheduler.pending().await, 0);
        assert!(h.store.is_empty().await);
        // Only the first clear found something to cancel.
        assert_eq!(h.scheduler.cancels.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn direct_push_success_clears_pending_retry_state() {
        let h = Harness::new(vec![Ok(())]);
        let entity = EntityId(7);

        h.controller.on_entity_published(entity, &published()).await;
        assert_eq!(h.scheduler.pending().await, 1);

        let outcome = h.controller.push_now(entity).await;

        assert!(outcome.success);
        assert_eq!(h.scheduler.pending().await, 0);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn direct_push_failure_reports_error_and_keeps_schedule() {
        let h = Harness::new(vec![Err(PushError::rejected("invalid markup"))]);
        let entity = EntityId(7);

        h.controller.on_entity_published(entity, &published()).await;
        let outcome = h.controller.push_now(entity).await;

        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("remote rejected the push: invalid markup")
        );
        assert_eq!(h.scheduler.pending().await, 1);
    }
}
