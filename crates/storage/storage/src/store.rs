use async_trait::async_trait;
use tokio::sync::mpsc;

use burnlink_message::{Message, Metadata};

use crate::error::StorageError;

/// Trait for reading and writing messages across storage backends.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// A single process-wide TTL applies to every entry in a backend instance:
/// an entry is observable only while `now < meta.created + TTL`, regardless
/// of whether it has been physically reclaimed yet.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Return the metadata for `key` iff the entry exists and is still
    /// fresh. Does not consume the entry.
    ///
    /// Fails with [`StorageError::NotFound`] when the key is absent,
    /// expired, or already consumed.
    async fn get_metadata(&self, key: &str) -> Result<Metadata, StorageError>;

    /// Atomically return the full message for `key` AND remove the entry.
    ///
    /// A message is observable through this method at most once; concurrent
    /// callers race and exactly one receives it. Fails with
    /// [`StorageError::NotFound`] when absent or expired, in which case
    /// nothing is removed.
    async fn get_message(&self, key: &str) -> Result<Message, StorageError>;

    /// Store `msg` at `key` and arrange for it to become unobservable once
    /// the TTL has elapsed.
    ///
    /// If the key already exists the backend may overwrite; callers avoid
    /// collisions by drawing keys from [`new_message_key`](Self::new_message_key),
    /// whose space dominates the live-entry count.
    async fn set_message(&self, key: &str, msg: Message) -> Result<(), StorageError>;

    /// Return a fresh random key suitable for `set_message`.
    ///
    /// The key is not reserved; a concurrent write to the same key is
    /// possible but vanishingly rare.
    fn new_message_key(&self) -> String;

    /// Run background maintenance until `shutdown` yields (or every sender
    /// is dropped), then return.
    ///
    /// Backends with no maintenance of their own simply wait for the
    /// signal. Maintenance failures are logged and never terminate the
    /// loop; TTL correctness does not depend on it.
    async fn run(&self, shutdown: mpsc::Receiver<()>) -> Result<(), StorageError>;
}
