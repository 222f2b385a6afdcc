//! Redis message store backend.
//!
//! Each message is a Redis hash with fields `data`, `created` (UNIX
//! seconds), `filename` and `content-type`; the key carries a native TTL so
//! expiry needs no pruner on our side. Lua scripts make the store+expire and
//! fetch+delete pairs single atomic steps, so the one-shot read guarantee
//! holds even with concurrent readers against the same key.
//!
//! Connections come from a `deadpool-redis` pool; the backend is reentrant.

mod config;
mod scripts;
mod store;

pub use config::RedisConfig;
pub use store::RedisMessageStore;
