use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info};

use burnlink_message::{Message, Metadata, keys};
use burnlink_storage::error::StorageError;
use burnlink_storage::store::MessageStore;

/// Configuration for the in-memory backend.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// How often the background pruner reclaims expired entries. Purely a
    /// memory-reclamation knob; TTL correctness comes from the per-read
    /// freshness check.
    pub prune_interval: Duration,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            prune_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// In-memory [`MessageStore`] backed by a mutex-protected map.
///
/// A single exclusive mutex serializes every operation, making the backend
/// linearizable. Reads must hold the lock exclusively anyway because
/// `get_message` deletes on success; `get_metadata` shares the same lock
/// rather than growing a second code path.
#[derive(Debug)]
pub struct MemoryMessageStore {
    data: Mutex<HashMap<String, Message>>,
    config: MemoryConfig,
    ttl: Duration,
}

impl MemoryMessageStore {
    /// Create a new, empty store with the given prune interval and TTL.
    #[must_use]
    pub fn new(config: MemoryConfig, ttl: Duration) -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            config,
            ttl,
        }
    }

    /// Number of physical entries, expired ones included.
    ///
    /// Observable for tests and diagnostics; the public API never exposes
    /// entries that have expired.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the map holds no physical entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Message>> {
        // The critical sections are plain map operations that cannot panic,
        // so a poisoned lock still guards a consistent map.
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prune_expired(&self) {
        let mut data = self.lock();
        let before = data.len();
        data.retain(|_, msg| !msg.meta.is_expired(self.ttl));

        let removed = before - data.len();
        if removed > 0 {
            debug!(removed, "pruned expired messages");
        }
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn get_metadata(&self, key: &str) -> Result<Metadata, StorageError> {
        let data = self.lock();
        match data.get(key) {
            Some(msg) if !msg.meta.is_expired(self.ttl) => Ok(msg.meta.clone()),
            _ => Err(StorageError::NotFound(key.to_owned())),
        }
    }

    async fn get_message(&self, key: &str) -> Result<Message, StorageError> {
        let mut data = self.lock();
        match data.get(key) {
            Some(msg) if !msg.meta.is_expired(self.ttl) => {}
            // Absent or expired: the only exit that does not delete.
            _ => return Err(StorageError::NotFound(key.to_owned())),
        }

        // One view only: remove before the lock is released so exactly one
        // concurrent reader can win. The lock is still held, so the entry
        // checked above cannot vanish in between.
        data.remove(key)
            .ok_or_else(|| StorageError::NotFound(key.to_owned()))
    }

    async fn set_message(&self, key: &str, msg: Message) -> Result<(), StorageError> {
        self.lock().insert(key.to_owned(), msg);
        Ok(())
    }

    fn new_message_key(&self) -> String {
        keys::new_key(keys::DEFAULT_KEY_LENGTH)
    }

    async fn run(&self, mut shutdown: mpsc::Receiver<()>) -> Result<(), StorageError> {
        let mut timer = interval(self.config.prune_interval);
        // The first tick completes immediately; skip it so pruning starts
        // one full interval after launch.
        timer.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("memory store pruner stopped");
                    return Ok(());
                }
                _ = timer.tick() => {
                    debug!("memory store pruner running");
                    self.prune_expired();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::join_all;

    use burnlink_storage::testing::run_store_conformance_tests;

    use super::*;

    fn test_store(ttl: Duration) -> MemoryMessageStore {
        MemoryMessageStore::new(MemoryConfig::default(), ttl)
    }

    fn text_message(text: &str) -> Message {
        let mut msg = Message::new();
        msg.data = text.as_bytes().to_vec();
        msg
    }

    #[tokio::test]
    async fn conformance() {
        let store = test_store(Duration::from_secs(3600));
        run_store_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn expired_entries_are_invisible_before_pruning() {
        // Wall-clock TTL: the entry must disappear from the API even though
        // no pruner is running.
        let store = test_store(Duration::from_millis(100));
        let key = store.new_message_key();
        store.set_message(&key, text_message("gone soon")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(matches!(
            store.get_metadata(&key).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.get_message(&key).await,
            Err(StorageError::NotFound(_))
        ));
        // The physical entry is still there until the pruner runs.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn expired_get_message_does_not_delete() {
        let store = test_store(Duration::from_millis(50));
        let key = store.new_message_key();
        store.set_message(&key, text_message("stale")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        let _ = store.get_message(&key).await;
        assert_eq!(store.len(), 1, "a NotFound read must not reclaim");
    }

    #[tokio::test]
    async fn pruner_reclaims_expired_entries() {
        let config = MemoryConfig {
            prune_interval: Duration::from_millis(50),
        };
        let store = Arc::new(MemoryMessageStore::new(config, Duration::from_millis(100)));

        for _ in 0..1000 {
            let key = store.new_message_key();
            store.set_message(&key, text_message("bulk")).await.unwrap();
        }
        assert_eq!(store.len(), 1000);

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let pruner = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.run(shutdown_rx).await })
        };

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.len(), 0, "pruner should have reclaimed every entry");

        shutdown_tx.send(()).await.unwrap();
        pruner.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn pruner_keeps_fresh_entries() {
        let config = MemoryConfig {
            prune_interval: Duration::from_millis(50),
        };
        let store = Arc::new(MemoryMessageStore::new(config, Duration::from_secs(3600)));

        let key = store.new_message_key();
        store.set_message(&key, text_message("keep me")).await.unwrap();

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let pruner = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.run(shutdown_rx).await })
        };

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(store.len(), 1);

        shutdown_tx.send(()).await.unwrap();
        pruner.await.unwrap().unwrap();

        let got = store.get_message(&key).await.unwrap();
        assert_eq!(got.data, b"keep me");
    }

    #[tokio::test]
    async fn run_returns_when_all_senders_drop() {
        let store = Arc::new(test_store(Duration::from_secs(3600)));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        let pruner = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.run(shutdown_rx).await })
        };

        drop(shutdown_tx);
        tokio::time::timeout(Duration::from_secs(1), pruner)
            .await
            .expect("run should stop promptly")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_reads_have_exactly_one_winner() {
        let store = Arc::new(test_store(Duration::from_secs(3600)));
        let key = store.new_message_key();
        store.set_message(&key, text_message("winner takes all")).await.unwrap();

        let tasks = (0..100).map(|_| {
            let store = Arc::clone(&store);
            let key = key.clone();
            tokio::spawn(async move { store.get_message(&key).await })
        });
        let results = join_all(tasks).await;

        let mut won = 0;
        let mut missed = 0;
        for result in results {
            match result.unwrap() {
                Ok(msg) => {
                    assert_eq!(msg.data, b"winner takes all");
                    won += 1;
                }
                Err(StorageError::NotFound(_)) => missed += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(won, 1, "exactly one reader may observe the message");
        assert_eq!(missed, 99);
    }

    #[tokio::test]
    async fn overwrite_replaces_the_entry() {
        let store = test_store(Duration::from_secs(3600));
        let key = store.new_message_key();

        store.set_message(&key, text_message("first")).await.unwrap();
        store.set_message(&key, text_message("second")).await.unwrap();

        let got = store.get_message(&key).await.unwrap();
        assert_eq!(got.data, b"second");
        assert_eq!(store.len(), 0);
    }
}
