use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use burnlink_storage::StorageError;

/// Errors that can occur when running the burnlink server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A storage error surfaced through the API.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Absent, expired and consumed keys are indistinguishable on
            // purpose; the body never says which it was.
            Self::Storage(StorageError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "provided key was not found")
            }
            Self::Config(_) | Self::Io(_) | Self::Storage(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "a server-side error occurred")
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
