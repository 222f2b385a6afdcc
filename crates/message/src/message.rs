use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored payload together with its metadata.
///
/// Messages are immutable between store and consumption: nothing may mutate
/// an entry once it has been written, and the first successful read destroys
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The raw payload bytes. May be empty; any size cap is enforced at the
    /// HTTP layer, not here.
    pub data: Vec<u8>,
    /// Metadata describing the payload.
    #[serde(rename = "metadata")]
    pub meta: Metadata,
}

/// Metadata describing a stored [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// When the message was constructed (UTC). Stamped once by
    /// [`Message::new`]; backends never re-stamp on store.
    pub created: DateTime<Utc>,
    /// Original filename for file payloads. Empty means the payload is
    /// inline text, not a file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filename: String,
    /// MIME type to serve the payload with. Empty means unspecified.
    #[serde(
        rename = "content-type",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub content_type: String,
}

impl Message {
    /// Create an empty message stamped with the current UTC time.
    ///
    /// This is the sole place `created` is assigned.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            meta: Metadata {
                created: Utc::now(),
                filename: String::new(),
                content_type: String::new(),
            },
        }
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl Metadata {
    /// Whether this entry has outlived `ttl`, measured against the wall
    /// clock. Entries created in the future (clock skew) count as fresh.
    #[must_use]
    pub fn is_expired(&self, ttl: std::time::Duration) -> bool {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Utc::now().signed_duration_since(self.created) >= ttl
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn new_message_is_empty_and_stamped() {
        let before = Utc::now();
        let msg = Message::new();
        let after = Utc::now();

        assert!(msg.data.is_empty());
        assert!(msg.meta.filename.is_empty());
        assert!(msg.meta.content_type.is_empty());
        assert!(msg.meta.created >= before && msg.meta.created <= after);
    }

    #[test]
    fn expiry_is_measured_from_created() {
        let mut msg = Message::new();
        assert!(!msg.meta.is_expired(Duration::from_secs(60)));

        msg.meta.created = Utc::now() - chrono::Duration::seconds(120);
        assert!(msg.meta.is_expired(Duration::from_secs(60)));
        assert!(!msg.meta.is_expired(Duration::from_secs(600)));
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let msg = Message::new();
        assert!(msg.meta.is_expired(Duration::ZERO));
    }

    #[test]
    fn metadata_serde_uses_wire_names() {
        let meta = Metadata {
            created: Utc::now(),
            filename: "report.pdf".into(),
            content_type: "application/pdf".into(),
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"content-type\":\"application/pdf\""));
        assert!(json.contains("\"filename\":\"report.pdf\""));

        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn empty_optionals_are_skipped() {
        let msg = Message::new();
        let json = serde_json::to_string(&msg.meta).unwrap();
        assert!(!json.contains("filename"));
        assert!(!json.contains("content-type"));
    }
}
