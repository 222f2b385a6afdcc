use std::sync::Arc;
use std::time::Duration;

use burnlink_storage::{MessageStore, StorageError};
use burnlink_storage_memory::{MemoryConfig, MemoryMessageStore};
use burnlink_storage_redis::{RedisConfig, RedisMessageStore};

use crate::config::StorageConfig;
use crate::error::ServerError;

/// Construct a [`MessageStore`] from configuration.
///
/// The single configured TTL is handed to whichever backend is selected, so
/// expiry behaves identically no matter where messages live. Unknown client
/// names fail before any resources are allocated.
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn MessageStore>, ServerError> {
    let ttl = config.ttl();
    match config.client.to_lowercase().as_str() {
        "memory" => Ok(create_memory(config, ttl)),
        // "external-kv" is the backend-neutral name for the same thing.
        "redis" | "external-kv" => create_redis(config, ttl),
        other => Err(ServerError::Storage(StorageError::UnsupportedBackend(
            other.to_owned(),
        ))),
    }
}

fn create_memory(config: &StorageConfig, ttl: Duration) -> Arc<dyn MessageStore> {
    let memory_config = MemoryConfig {
        prune_interval: Duration::from_secs(config.memory.prune_interval_seconds),
    };
    Arc::new(MemoryMessageStore::new(memory_config, ttl))
}

fn create_redis(config: &StorageConfig, ttl: Duration) -> Result<Arc<dyn MessageStore>, ServerError> {
    if config.redis.db > 15 {
        return Err(ServerError::Config(format!(
            "redis db index out of range (0-15): {}",
            config.redis.db
        )));
    }

    let redis_config = RedisConfig {
        addr: config.redis.addr.clone(),
        db: config.redis.db,
        password: config.redis.password.clone(),
        ..RedisConfig::default()
    };
    let store = RedisMessageStore::new(&redis_config, ttl)
        .map_err(|e| ServerError::Config(format!("redis store: {e}")))?;
    Ok(Arc::new(store))
}
