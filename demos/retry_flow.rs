//! End-to-end retry flow against a flaky push client.
//!
//! The client fails twice, then succeeds; the controller retries with a
//! short delay so the whole cycle fits in a few seconds. Run with:
//!
//! ```text
//! cargo run --example retry_flow --features logging
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use repush::{
    meta, ContentKind, ControllerConfig, EntityId, EntityState, LogWriter, MemoryStore,
    MetadataStore, PushClient, PushError, RetryController, RetryHooks, TokioScheduler,
};

/// Succeeds on the third delivery attempt.
struct FlakyClient {
    calls: AtomicU32,
}

#[async_trait]
impl PushClient for FlakyClient {
    async fn push(&self, entity: EntityId) -> Result<(), PushError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        println!("  (client) delivering entity {entity}, attempt {n}");
        if n < 3 {
            Err(PushError::transport("connection reset by peer"))
        } else {
            Ok(())
        }
    }
}

/// Retries every 300ms instead of the production default.
struct ShortDelay;

impl RetryHooks for ShortDelay {
    fn delay(&self, _default: Duration) -> Duration {
        Duration::from_millis(300)
    }
}

#[tokio::main]
async fn main() {
    let entity = EntityId(7);

    let store = Arc::new(MemoryStore::new());
    store
        .set(entity, meta::REMOTE_SHARE_URL, "https://dist.example/articles/7".into())
        .await;

    let controller = RetryController::builder(
        ControllerConfig::default(),
        store.clone(),
        Arc::new(FlakyClient {
            calls: AtomicU32::new(0),
        }),
        Arc::new(TokioScheduler::new()),
    )
    .with_hooks(Arc::new(ShortDelay))
    .with_subscribers(vec![Arc::new(LogWriter)])
    .build();

    println!("publishing entity {entity}");
    controller
        .on_entity_published(entity, &EntityState::published(ContentKind::Article))
        .await;

    // Let the three scheduled attempts play out.
    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("done");
}
