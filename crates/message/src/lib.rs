//! Core domain types for burnlink.
//!
//! A [`Message`] is an opaque payload (text or file bytes) plus its
//! [`Metadata`]: the creation instant and, for file payloads, the original
//! filename and MIME type. Messages are addressed by short random keys
//! produced by the [`keys`] module.

pub mod keys;
mod message;

pub use keys::{DEFAULT_KEY_LENGTH, key_from_rng, new_key};
pub use message::{Message, Metadata};
