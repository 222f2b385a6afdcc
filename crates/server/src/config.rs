use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration for the burnlink server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct BurnlinkConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Message storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body size in bytes. `0` disables the limit.
    #[serde(default)]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: 0,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8080
}

/// Configuration for the message storage backend.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Which backend to use: `"memory"` or `"redis"` (alias `"external-kv"`).
    #[serde(default = "default_client")]
    pub client: String,

    /// Time-to-live for messages before they expire, in seconds. One value
    /// for every entry in the chosen backend.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// In-memory backend settings.
    #[serde(default)]
    pub memory: MemoryStorageConfig,

    /// Redis backend settings.
    #[serde(default)]
    pub redis: RedisStorageConfig,
}

impl StorageConfig {
    /// The configured TTL as a [`Duration`].
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            client: default_client(),
            ttl_seconds: default_ttl_seconds(),
            memory: MemoryStorageConfig::default(),
            redis: RedisStorageConfig::default(),
        }
    }
}

fn default_client() -> String {
    "memory".to_owned()
}

fn default_ttl_seconds() -> u64 {
    48 * 3600
}

/// Settings for the in-memory backend.
#[derive(Debug, Deserialize)]
pub struct MemoryStorageConfig {
    /// How often to prune expired messages, in seconds.
    #[serde(default = "default_prune_interval_seconds")]
    pub prune_interval_seconds: u64,
}

impl Default for MemoryStorageConfig {
    fn default() -> Self {
        Self {
            prune_interval_seconds: default_prune_interval_seconds(),
        }
    }
}

fn default_prune_interval_seconds() -> u64 {
    5 * 60
}

/// Settings for the Redis backend.
#[derive(Debug, Deserialize)]
pub struct RedisStorageConfig {
    /// Address (`host:port`) of the Redis server.
    #[serde(default = "default_redis_addr")]
    pub addr: String,
    /// Redis database index (0-15).
    #[serde(default)]
    pub db: u8,
    /// Server password; empty means no authentication.
    #[serde(default)]
    pub password: String,
}

impl Default for RedisStorageConfig {
    fn default() -> Self {
        Self {
            addr: default_redis_addr(),
            db: 0,
            password: String::new(),
        }
    }
}

fn default_redis_addr() -> String {
    "localhost:6379".to_owned()
}
