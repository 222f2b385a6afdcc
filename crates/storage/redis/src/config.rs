use std::time::Duration;

/// Configuration for the Redis message store backend.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Address (`host:port`) of the Redis server.
    pub addr: String,

    /// Redis database index (0-15).
    pub db: u8,

    /// Server password; empty means no authentication.
    pub password: String,

    /// Number of connections in the `deadpool-redis` pool.
    pub pool_size: usize,

    /// Timeout for acquiring a pooled connection.
    pub connection_timeout: Duration,
}

impl RedisConfig {
    /// Render the connection URL understood by `deadpool-redis`.
    #[must_use]
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}/{}", self.addr, self.db)
        } else {
            format!("redis://:{}@{}/{}", self.password, self.addr, self.db)
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: String::from("localhost:6379"),
            db: 0,
            password: String::new(),
            pool_size: 10,
            connection_timeout: Duration::from_secs(5),
        }
    }
}
