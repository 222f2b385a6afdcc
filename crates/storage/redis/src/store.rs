use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use deadpool_redis::{Config, Pool, Runtime};
use redis::{AsyncCommands, Script};
use tokio::sync::mpsc;
use tracing::info;

use burnlink_message::{Message, Metadata, keys};
use burnlink_storage::error::StorageError;
use burnlink_storage::store::MessageStore;

use crate::config::RedisConfig;
use crate::scripts;

/// Redis-backed implementation of [`MessageStore`].
///
/// Uses a `deadpool-redis` connection pool and Lua scripts for atomicity.
/// Expiry rides on Redis key TTLs, armed in the same script that stores the
/// hash, so no background pruning is needed on our side.
pub struct RedisMessageStore {
    pool: Pool,
    ttl: Duration,
}

impl RedisMessageStore {
    /// Create a new `RedisMessageStore` from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the pool cannot be created.
    pub fn new(config: &RedisConfig, ttl: Duration) -> Result<Self, StorageError> {
        let cfg = Config::from_url(config.url());
        let pool = cfg
            .builder()
            .map(|b| {
                b.max_size(config.pool_size)
                    .wait_timeout(Some(config.connection_timeout))
                    .runtime(Runtime::Tokio1)
                    .build()
            })
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(Self { pool, ttl })
    }

    /// Obtain a connection from the pool.
    async fn conn(&self) -> Result<deadpool_redis::Connection, StorageError> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

#[async_trait]
impl MessageStore for RedisMessageStore {
    async fn get_metadata(&self, key: &str) -> Result<Metadata, StorageError> {
        let mut conn = self.conn().await?;

        let fields: HashMap<String, Vec<u8>> = conn
            .hgetall(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if fields.is_empty() {
            return Err(StorageError::NotFound(key.to_owned()));
        }

        Ok(decode_hash(key, fields)?.meta)
    }

    async fn get_message(&self, key: &str) -> Result<Message, StorageError> {
        let mut conn = self.conn().await?;

        // Fetch and delete run as one server-side step; of any number of
        // concurrent readers exactly one receives the hash.
        let fields: Option<HashMap<String, Vec<u8>>> = Script::new(scripts::TAKE_MESSAGE)
            .key(key)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let fields = fields.ok_or_else(|| StorageError::NotFound(key.to_owned()))?;
        decode_hash(key, fields)
    }

    async fn set_message(&self, key: &str, msg: Message) -> Result<(), StorageError> {
        let mut conn = self.conn().await?;

        let _: i64 = Script::new(scripts::SET_MESSAGE)
            .key(key)
            .arg(msg.data.as_slice())
            .arg(msg.meta.created.timestamp())
            .arg(&msg.meta.filename)
            .arg(&msg.meta.content_type)
            .arg(self.ttl_ms())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    fn new_message_key(&self) -> String {
        keys::new_key(keys::DEFAULT_KEY_LENGTH)
    }

    async fn run(&self, mut shutdown: mpsc::Receiver<()>) -> Result<(), StorageError> {
        // Expiry is handled by the server itself; nothing to maintain.
        let _ = shutdown.recv().await;
        info!("redis store stopped");
        Ok(())
    }
}

/// Decode an HGETALL-style field map into a [`Message`].
///
/// `data` may hold arbitrary bytes; the remaining fields must be UTF-8 and
/// `created` must be decimal UNIX seconds, matching what `set_message`
/// writes.
fn decode_hash(key: &str, mut fields: HashMap<String, Vec<u8>>) -> Result<Message, StorageError> {
    let data = fields.remove("data").unwrap_or_default();

    let created = fields
        .remove("created")
        .and_then(|raw| String::from_utf8(raw).ok())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| StorageError::Backend(format!("malformed created field for key: {key}")))?;

    Ok(Message {
        data,
        meta: Metadata {
            created,
            filename: string_field(key, fields.remove("filename"))?,
            content_type: string_field(key, fields.remove("content-type"))?,
        },
    })
}

fn string_field(key: &str, raw: Option<Vec<u8>>) -> Result<String, StorageError> {
    match raw {
        Some(bytes) => String::from_utf8(bytes)
            .map_err(|e| StorageError::Backend(format!("non-UTF-8 field for key {key}: {e}"))),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn hash(entries: &[(&str, &[u8])]) -> HashMap<String, Vec<u8>> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.to_vec()))
            .collect()
    }

    #[test]
    fn decode_full_hash() {
        let fields = hash(&[
            ("data", b"hello"),
            ("created", b"1700000000"),
            ("filename", b"notes.txt"),
            ("content-type", b"text/plain"),
        ]);

        let msg = decode_hash("k", fields).unwrap();
        assert_eq!(msg.data, b"hello");
        assert_eq!(msg.meta.created.timestamp(), 1_700_000_000);
        assert_eq!(msg.meta.filename, "notes.txt");
        assert_eq!(msg.meta.content_type, "text/plain");
    }

    #[test]
    fn decode_preserves_binary_payloads() {
        let payload: Vec<u8> = (0u8..=255).collect();
        let fields = hash(&[("data", payload.as_slice()), ("created", b"1700000000")]);

        let msg = decode_hash("k", fields).unwrap();
        assert_eq!(msg.data, payload);
        assert_eq!(msg.meta.filename, "");
        assert_eq!(msg.meta.content_type, "");
    }

    #[test]
    fn decode_rejects_missing_created() {
        let fields = hash(&[("data", b"x")]);
        let err = decode_hash("k", fields).unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }

    #[test]
    fn decode_rejects_garbage_created() {
        let fields = hash(&[("data", b"x"), ("created", b"not-a-timestamp")]);
        let err = decode_hash("k", fields).unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }

    #[test]
    fn decode_rejects_non_utf8_filename() {
        let fields = hash(&[
            ("data", b"x"),
            ("created", b"1700000000"),
            ("filename", &[0xff, 0xfe][..]),
        ]);
        let err = decode_hash("k", fields).unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }

    #[test]
    fn ttl_saturates_instead_of_overflowing() {
        let cfg = RedisConfig::default();
        let store = RedisMessageStore::new(&cfg, Duration::MAX).unwrap();
        assert_eq!(store.ttl_ms(), i64::MAX);
    }

    #[test]
    fn timestamps_round_trip_at_second_precision() {
        let now = Utc::now();
        let restored = DateTime::from_timestamp(now.timestamp(), 0).unwrap();
        assert_eq!(restored.timestamp(), now.timestamp());
    }
}
