use burnlink_message::Message;

use crate::error::StorageError;
use crate::store::MessageStore;

/// Run the full message store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance
/// configured with a TTL comfortably longer than the test run.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_store_conformance_tests(store: &dyn MessageStore) -> Result<(), StorageError> {
    test_get_missing(store).await?;
    test_text_round_trip(store).await?;
    test_file_round_trip(store).await?;
    test_one_shot_read(store).await?;
    test_metadata_does_not_consume(store).await?;
    test_metadata_is_stable(store).await?;
    test_key_shape(store)?;
    Ok(())
}

async fn test_get_missing(store: &dyn MessageStore) -> Result<(), StorageError> {
    // A fresh random key cannot have been written.
    let key = store.new_message_key();

    let meta = store.get_metadata(&key).await;
    assert!(
        matches!(meta, Err(StorageError::NotFound(_))),
        "get_metadata on a missing key should be NotFound"
    );

    let msg = store.get_message(&key).await;
    assert!(
        matches!(msg, Err(StorageError::NotFound(_))),
        "get_message on a missing key should be NotFound"
    );
    Ok(())
}

async fn test_text_round_trip(store: &dyn MessageStore) -> Result<(), StorageError> {
    let key = store.new_message_key();
    let mut msg = Message::new();
    msg.data = b"hello".to_vec();

    store.set_message(&key, msg.clone()).await?;

    let meta = store.get_metadata(&key).await?;
    assert_eq!(
        meta.created.timestamp(),
        msg.meta.created.timestamp(),
        "created should survive the round trip (second precision)"
    );
    assert!(meta.filename.is_empty(), "text messages carry no filename");
    assert!(meta.content_type.is_empty());

    let got = store.get_message(&key).await?;
    assert_eq!(got.data, b"hello");
    Ok(())
}

async fn test_file_round_trip(store: &dyn MessageStore) -> Result<(), StorageError> {
    let key = store.new_message_key();
    let mut msg = Message::new();
    // Every byte value, including invalid UTF-8, must survive byte-exact.
    msg.data = (0u8..=255).collect();
    msg.meta.filename = "report.pdf".to_owned();
    msg.meta.content_type = "application/pdf".to_owned();

    store.set_message(&key, msg.clone()).await?;

    let got = store.get_message(&key).await?;
    assert_eq!(got.data, msg.data, "payload bytes must be byte-exact");
    assert_eq!(got.meta.filename, "report.pdf");
    assert_eq!(got.meta.content_type, "application/pdf");
    assert_eq!(got.meta.created.timestamp(), msg.meta.created.timestamp());
    Ok(())
}

async fn test_one_shot_read(store: &dyn MessageStore) -> Result<(), StorageError> {
    let key = store.new_message_key();
    let mut msg = Message::new();
    msg.data = b"burn after reading".to_vec();

    store.set_message(&key, msg).await?;

    let first = store.get_message(&key).await?;
    assert_eq!(first.data, b"burn after reading");

    let second = store.get_message(&key).await;
    assert!(
        matches!(second, Err(StorageError::NotFound(_))),
        "second get_message should be NotFound"
    );

    let meta = store.get_metadata(&key).await;
    assert!(
        matches!(meta, Err(StorageError::NotFound(_))),
        "metadata should be gone after consumption"
    );
    Ok(())
}

async fn test_metadata_does_not_consume(store: &dyn MessageStore) -> Result<(), StorageError> {
    let key = store.new_message_key();
    let mut msg = Message::new();
    msg.data = b"still here".to_vec();

    store.set_message(&key, msg).await?;

    store.get_metadata(&key).await?;
    store.get_metadata(&key).await?;

    let got = store.get_message(&key).await?;
    assert_eq!(
        got.data, b"still here",
        "metadata reads must not consume the message"
    );
    Ok(())
}

async fn test_metadata_is_stable(store: &dyn MessageStore) -> Result<(), StorageError> {
    let key = store.new_message_key();
    store.set_message(&key, Message::new()).await?;

    let first = store.get_metadata(&key).await?;
    let second = store.get_metadata(&key).await?;
    assert_eq!(
        first.created, second.created,
        "created must be identical across metadata reads"
    );
    Ok(())
}

fn test_key_shape(store: &dyn MessageStore) -> Result<(), StorageError> {
    let a = store.new_message_key();
    let b = store.new_message_key();

    assert_eq!(a.len(), 12, "default key length is 12");
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(a, b, "successive keys must differ");
    Ok(())
}
