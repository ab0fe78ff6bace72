//! # repush
//!
//! **repush** retries a failed asynchronous "publish" operation against an
//! external content-distribution service on behalf of individual content
//! items, with bounded attempts and delayed re-invocation.
//!
//! The crate owns one piece of real logic, the [`RetryController`] state
//! machine. Everything around it (detecting that an item was published,
//! performing the network push, persisting metadata, running delayed jobs)
//! is delegated to collaborator traits the host implements or the bundled
//! defaults provide.
//!
//! ## Architecture
//! ```text
//!  host publish signal          external success signal
//!          │                              │
//!          ▼                              ▼
//!  ┌───────────────────────────────────────────────┐
//!  │  RetryController (attempt/scheduling machine) │
//!  │   - qualify → clear → should_schedule → arm   │
//!  │   - on firing: stale guard → push → evaluate  │
//!  │   - bounded reschedule (MAX_ATTEMPTS = 3)     │
//!  └──┬───────────┬───────────────┬────────────┬───┘
//!     ▼           ▼               ▼            ▼
//!  PushClient  Scheduler     MetadataStore    Bus ──► SubscriberSet
//!  (1 attempt  (delayed      (typed retry     (broadcast)   │
//!   per call)   one-shots)    record)              ┌────────┼────────┐
//!                                                  ▼        ▼        ▼
//!                                               worker1  worker2  workerN
//!                                                  ▼        ▼        ▼
//!                                              sub1.on  sub2.on  subN.on
//!                                               _event() _event() _event()
//! ```
//!
//! ## Lifecycle of a cycle
//! ```text
//! Idle ──(qualifying publish)──► Scheduled ──(delay elapses)──► Attempting
//!   ▲                                ▲                              │
//!   │                                └── failure, attempts left ────┤
//!   └── success / external success / attempts exhausted ────────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                            | Key types / traits                               |
//! |-------------------|--------------------------------------------------------|--------------------------------------------------|
//! | **Controller**    | Attempt counting, (re)scheduling, idempotent cleanup   | [`RetryController`]                              |
//! | **Collaborators** | Host-implemented seams                                 | [`MetadataStore`], [`PushClient`], [`Scheduler`] |
//! | **Hooks**         | Pure decision points (suppress scheduling, tune delay) | [`RetryHooks`]                                   |
//! | **Events**        | Success/failure notification contract                  | [`Event`], [`EventKind`], [`Subscribe`]          |
//! | **Defaults**      | In-process store and timer                             | [`MemoryStore`], [`TokioScheduler`]              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use repush::{
//!     ContentKind, ControllerConfig, EntityId, EntityState, MemoryStore, PushClient,
//!     PushError, RetryController, TokioScheduler,
//! };
//!
//! struct WireClient;
//!
//! #[async_trait::async_trait]
//! impl PushClient for WireClient {
//!     async fn push(&self, entity: EntityId) -> Result<(), PushError> {
//!         // exactly one delivery attempt against the remote service
//!         let _ = entity;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = RetryController::builder(
//!         ControllerConfig::default(),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(WireClient),
//!         Arc::new(TokioScheduler::new()),
//!     )
//!     .build();
//!
//!     // Host wiring layer binds its own "post published" event to this call.
//!     let state = EntityState::published(ContentKind::Article);
//!     controller.on_entity_published(EntityId(7), &state).await;
//! }
//! ```

mod config;
mod controller;
mod entity;
mod error;
mod events;
mod policies;
mod push;
mod schedule;
mod state;
mod store;
mod subscribers;

// ---- Public re-exports ----

pub use config::{ControllerConfig, DEFAULT_DELAY, MAX_ATTEMPTS};
pub use controller::{ControllerBuilder, RetryController};
pub use entity::{ContentKind, EntityId, EntityState, EntityStatus};
pub use error::PushError;
pub use events::{Bus, Event, EventKind};
pub use policies::{DefaultHooks, RetryHooks};
pub use push::{PushClient, PushOutcome};
pub use schedule::{JobFuture, JobKey, Scheduler, TokioScheduler};
pub use state::{meta, RetryState};
pub use store::{MemoryStore, MetadataStore};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
