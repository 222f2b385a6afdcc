use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error description.
    pub error: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is serving requests.
    pub status: String,
}

/// Landing view for `GET /{key}`: what kind of payload hides behind the key
/// and where to fetch it, without consuming it.
#[derive(Debug, Serialize, Deserialize)]
pub struct LandingResponse {
    /// The message key.
    pub key: String,
    /// `"file"` when the payload carries a filename, `"message"` otherwise.
    pub kind: String,
    /// Relative URL that retrieves (and destroys) the payload.
    pub link: String,
    /// When the message was created.
    pub created: DateTime<Utc>,
}
