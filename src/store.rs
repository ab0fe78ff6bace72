//! # Per-entity metadata persistence.
//!
//! [`MetadataStore`] is the seam to the host's key/value persistence layer:
//! get/set/delete of string values keyed by `(entity id, key name)`. The
//! controller persists its typed retry record through it (see
//! [`RetryState`](crate::RetryState)) and reads a few host-owned keys.
//!
//! ## Rules
//! - Methods are infallible by contract; durability concerns belong to the
//!   implementation, not to callers.
//! - Operations for the same entity id are expected to be effectively
//!   serialized by the implementation.
//! - `delete` of an absent key is a no-op.
//!
//! [`MemoryStore`] is the bundled in-process implementation used by tests
//! and demos.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entity::EntityId;

/// Key/value persistence attached to individual entities.
///
/// Implementations wrap whatever the host already uses for per-item
/// metadata (a database table, a document field, an in-memory map).
#[async_trait]
pub trait MetadataStore: Send + Sync + 'static {
    /// Returns the value stored under `(entity, key)`, if any.
    async fn get(&self, entity: EntityId, key: &str) -> Option<String>;

    /// Stores `value` under `(entity, key)`, replacing any previous value.
    async fn set(&self, entity: EntityId, key: &str, value: String);

    /// Removes the value stored under `(entity, key)`, if any.
    async fn delete(&self, entity: EntityId, key: &str);
}

/// In-process [`MetadataStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(EntityId, String), String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values across all entities.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn get(&self, entity: EntityId, key: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(&(entity, key.to_string()))
            .cloned()
    }

    async fn set(&self, entity: EntityId, key: &str, value: String) {
        self.entries
            .write()
            .await
            .insert((entity, key.to_string()), value);
    }

    async fn delete(&self, entity: EntityId, key: &str) {
        self.entries.write().await.remove(&(entity, key.to_string()));
    }
}
