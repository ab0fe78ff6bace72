//! # Typed per-entity retry record.
//!
//! The controller's auxiliary state lives in the host's metadata store
//! under two keys: the attempt counter and the informational timestamp of
//! the next pending invocation. [`RetryState`] is the typed view over that
//! pair; the loose key/value representation never leaks past this module.
//!
//! Host-owned keys ([`meta::REMOTE_ID`], [`meta::REMOTE_PENDING`],
//! [`meta::REMOTE_SHARE_URL`]) record facts about the remote publication.
//! The controller only reads them.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::entity::EntityId;
use crate::store::MetadataStore;

/// Metadata key names used by the controller.
pub mod meta {
    /// Controller-owned: retry attempt counter for the current cycle.
    pub const ATTEMPTS: &str = "repush_attempts";
    /// Controller-owned: unix seconds of the next pending invocation.
    /// Informational only; the scheduler is authoritative.
    pub const NEXT_SCHEDULED: &str = "repush_next_scheduled";

    /// Host-owned: id assigned by the remote service once published.
    pub const REMOTE_ID: &str = "remote_id";
    /// Host-owned: truthy while the remote publication is still pending.
    pub const REMOTE_PENDING: &str = "remote_pending";
    /// Host-owned: public share URL returned by the remote service.
    pub const REMOTE_SHARE_URL: &str = "remote_share_url";
}

/// Auxiliary retry bookkeeping attached to one entity.
///
/// `attempts` is monotonically non-decreasing within one cycle and deleted
/// when the cycle ends. `next_at` is best-effort bookkeeping and is never
/// read back for control decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryState {
    /// Number recorded for the next scheduled attempt; `0` means absent
    /// (the first firing counts as attempt 1).
    pub attempts: u32,
    /// Wall-clock time of the next pending invocation, if recorded.
    pub next_at: Option<SystemTime>,
}

impl RetryState {
    /// Loads the record for `entity`. Missing or unparseable values read
    /// as absent.
    pub async fn load(store: &dyn MetadataStore, entity: EntityId) -> Self {
        let attempts = store
            .get(entity, meta::ATTEMPTS)
            .await
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(0);

        let next_at = store
            .get(entity, meta::NEXT_SCHEDULED)
            .await
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| UNIX_EPOCH + Duration::from_secs(secs));

        Self { attempts, next_at }
    }

    /// Persists the attempt counter for `entity`.
    pub async fn persist_attempts(store: &dyn MetadataStore, entity: EntityId, attempts: u32) {
        store
            .set(entity, meta::ATTEMPTS, attempts.to_string())
            .await;
    }

    /// Persists the next-invocation timestamp for `entity` as unix seconds.
    pub async fn persist_next_at(store: &dyn MetadataStore, entity: EntityId, at: SystemTime) {
        let secs = at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        store
            .set(entity, meta::NEXT_SCHEDULED, secs.to_string())
            .await;
    }

    /// Deletes both controller-owned keys for `entity`.
    pub async fn clear(store: &dyn MetadataStore, entity: EntityId) {
        store.delete(entity, meta::ATTEMPTS).await;
        store.delete(entity, meta::NEXT_SCHEDULED).await;
    }
}

/// True when the remote service already holds a published copy of `entity`:
/// a remote id is assigned and the publication is no longer pending.
///
/// This is the stale-schedule guard: a firing that observes this state must
/// not push again.
pub async fn remote_already_published(store: &dyn MetadataStore, entity: EntityId) -> bool {
    let has_remote_id = store
        .get(entity, meta::REMOTE_ID)
        .await
        .is_some_and(|v| !v.trim().is_empty());
    if !has_remote_id {
        return false;
    }

    let pending = store
        .get(entity, meta::REMOTE_PENDING)
        .await
        .is_some_and(|v| is_truthy(&v));
    !pending
}

/// Host stores flags as strings; accept the common spellings.
fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "yes")
}
