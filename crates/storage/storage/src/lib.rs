//! Storage trait abstraction for burnlink message backends.
//!
//! Every backend implements [`MessageStore`]: a key-addressed store with
//! consume-on-read semantics and TTL-based expiration. The [`testing`]
//! module holds a conformance suite that backend crates run against their
//! implementations.

pub mod error;
pub mod store;
pub mod testing;

pub use error::StorageError;
pub use store::MessageStore;
