//! Cached data access tests over the in-memory tag store

mod helpers;

use helpers::{FakeTagStore, EPISODE_ID, GUEST, MEDIA_URL};
use podindex_common::cache::ManualClock;
use podindex_common::Error;
use podindex_web::data::DataAccess;
use std::collections::BTreeSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(3600);

fn data_access() -> (DataAccess, Arc<FakeTagStore>, Arc<ManualClock>) {
    let store = Arc::new(FakeTagStore::with_fixture());
    let clock = Arc::new(ManualClock::new());
    let data = DataAccess::new(store.clone(), TTL, clock.clone(), 4);
    (data, store, clock)
}

#[tokio::test]
async fn test_guests_cached_until_expiry() {
    let (data, store, clock) = data_access();

    let guests = data.guests().await.unwrap();
    assert_eq!(guests.len(), 1);
    assert_eq!(guests[0].name, GUEST);
    data.guests().await.unwrap();
    assert_eq!(store.query_count.load(Ordering::SeqCst), 1);

    clock.advance(TTL);
    data.guests().await.unwrap();
    assert_eq!(store.query_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unknown_guest_is_not_found() {
    let (data, _store, _clock) = data_access();
    assert!(matches!(data.guest("Nobody").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_topics_ranked_and_documents_prefetched() {
    let (data, store, _clock) = data_access();

    let index = data.topics().await.unwrap();
    let keys: Vec<&str> = index.topics.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["mars", "tesla"]);
    assert_eq!(store.document_fetches.load(Ordering::SeqCst), 1);

    // documents come from the warmed cache
    assert_eq!(data.media_url(EPISODE_ID).await.unwrap(), MEDIA_URL);
    assert!(!data.document_tags(EPISODE_ID).await.unwrap().is_empty());
    assert_eq!(store.document_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_prefetch_skips_cached_and_survives_failures() {
    let (data, store, _clock) = data_access();

    let ids: BTreeSet<String> = [EPISODE_ID, "missing"].iter().map(|s| s.to_string()).collect();
    assert_eq!(data.prefetch_documents(ids.clone()).await, 1);
    assert_eq!(store.document_fetches.load(Ordering::SeqCst), 2);

    // only the failed document is fetched again
    assert_eq!(data.prefetch_documents(ids).await, 0);
    assert_eq!(store.document_fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_entity_tags_for_topic_and_guest() {
    let (data, _store, _clock) = data_access();

    let index = data.topics().await.unwrap();
    let mars = index.get("Mars").unwrap();
    let guests = data.guests_by_topic(mars).await.unwrap();
    assert_eq!(guests[0].name, GUEST);

    let tags = data.entity_tags(mars, GUEST).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].display_value(), "Mars");
}

#[tokio::test]
async fn test_timestamp_tags_ordered_by_start() {
    let (data, _store, _clock) = data_access();

    let tokens = data.timestamp_tags(EPISODE_ID).await.unwrap();
    let words: Vec<&str> = tokens.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(words, vec!["we", "will", "build", "a", "colony", "on", "Mars"]);
}

#[tokio::test]
async fn test_store_failure_propagates_and_is_not_cached() {
    let (data, store, _clock) = data_access();

    store.fail.store(true, Ordering::SeqCst);
    let err = data.guests().await.unwrap_err();
    assert!(err.is_remote());

    store.fail.store(false, Ordering::SeqCst);
    assert_eq!(data.guests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_purge_expired_empties_stale_caches() {
    let (data, _store, clock) = data_access();

    data.guests().await.unwrap();
    data.topics().await.unwrap();
    assert_eq!(data.purge_expired().await, 0);

    clock.advance(TTL + Duration::from_secs(1));
    // guests, topic index and the prefetched document
    assert_eq!(data.purge_expired().await, 3);
}
