use thiserror::Error;

/// Errors from message store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key does not exist, has expired, or was already consumed. The
    /// three cases are deliberately indistinguishable so that callers cannot
    /// probe the key space.
    #[error("no message found for key: {0}")]
    NotFound(String),

    /// The underlying storage operation failed (transport, remote server,
    /// or encoding failure).
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend connection could not be established.
    #[error("connection error: {0}")]
    Connection(String),

    /// The factory was asked to build an unknown backend variant.
    #[error("unsupported storage client: {0}")]
    UnsupportedBackend(String),
}
