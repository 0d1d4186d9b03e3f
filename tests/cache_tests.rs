use dealcoach_relay::{transcript_key, TranscriptCache};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn test_set_and_get() {
    let cache = TranscriptCache::new(Duration::from_secs(60));
    cache.set("transcript:meeting:42", "hello world".into()).await;

    assert_eq!(
        cache.get("transcript:meeting:42").await.as_deref(),
        Some("hello world")
    );
    assert_eq!(cache.get("transcript:meeting:99").await, None);
}

#[tokio::test]
async fn test_expired_entry_is_not_returned() {
    let cache = TranscriptCache::new(Duration::from_secs(60));
    cache
        .set_with_ttl("k", "v".into(), Duration::from_millis(10))
        .await;

    sleep(Duration::from_millis(40)).await;
    assert_eq!(cache.get("k").await, None);
    assert!(cache.is_empty().await, "expired entry removed on access");
}

#[tokio::test]
async fn test_ttl_reports_remaining_lifetime() {
    let cache = TranscriptCache::new(Duration::from_secs(60));
    cache.set("k", "v".into()).await;

    let remaining = cache.ttl("k").await.expect("live entry has a ttl");
    assert!(remaining <= Duration::from_secs(60));
    assert!(remaining > Duration::from_secs(50));
    assert_eq!(cache.ttl("missing").await, None);
}

#[tokio::test]
async fn test_clear_pattern_prefix() {
    let cache = TranscriptCache::new(Duration::from_secs(60));
    cache.set(&transcript_key(1), "a".into()).await;
    cache.set(&transcript_key(2), "b".into()).await;
    cache.set("other:key", "c".into()).await;

    let removed = cache.clear_pattern("transcript:meeting:*").await;
    assert_eq!(removed, 2);
    assert_eq!(cache.len().await, 1);
    assert_eq!(cache.get("other:key").await.as_deref(), Some("c"));
}

#[tokio::test]
async fn test_clear_pattern_literal_key() {
    let cache = TranscriptCache::new(Duration::from_secs(60));
    cache.set("a", "1".into()).await;
    cache.set("ab", "2".into()).await;

    let removed = cache.clear_pattern("a").await;
    assert_eq!(removed, 1);
    assert_eq!(cache.get("ab").await.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_purge_expired() {
    let cache = TranscriptCache::new(Duration::from_secs(60));
    cache
        .set_with_ttl("short-1", "v".into(), Duration::from_millis(10))
        .await;
    cache
        .set_with_ttl("short-2", "v".into(), Duration::from_millis(10))
        .await;
    cache.set("long", "v".into()).await;

    sleep(Duration::from_millis(40)).await;
    assert_eq!(cache.purge_expired().await, 2);
    assert_eq!(cache.len().await, 1);
}

#[test]
fn test_transcript_key_format() {
    assert_eq!(transcript_key(42), "transcript:meeting:42");
}
