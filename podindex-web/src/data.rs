//! Cached lookups against the tag store
//!
//! Every lookup is a typed filter expression (or document fetch) whose
//! result is cached per call and arguments for the configured time-to-live.
//! Loading the topic index also pre-warms the document cache by fetching
//! every referenced document through a bounded [`TaskGroup`].

use podindex_common::cache::{Clock, TtlCache};
use podindex_common::tag::{KIND_ENTITIES, KIND_GUEST, KIND_TIMESTAMP};
use podindex_common::task_group::{TaskError, TaskGroup};
use podindex_common::{Document, Error, Result, Tag, TagFilter};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::steamship::TagStore;

/// Entity names that are never topics
pub const IGNORED_TOPIC_NAMES: [&str; 5] =
    ["email_address", "person_age", "url", "time", "money_amount"];

/// One topic with the documents that mention it
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTopic {
    /// Lower-cased `value["value"]`, the grouping key
    pub key: String,
    /// Every spelling seen for this topic
    pub variants: BTreeSet<String>,
    /// Distinct documents mentioning the topic
    pub documents: BTreeSet<String>,
}

impl RankedTopic {
    /// Title-cased key for display
    pub fn title(&self) -> String {
        title_case(&self.key)
    }
}

/// Topics ranked by descending distinct-document count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicIndex {
    pub topics: Vec<RankedTopic>,
}

impl TopicIndex {
    pub fn get(&self, key: &str) -> Option<&RankedTopic> {
        let key = key.to_lowercase();
        self.topics.iter().find(|t| t.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Group entity tags into ranked topics
///
/// Tags named in [`IGNORED_TOPIC_NAMES`] are dropped. Topics are sorted by
/// strictly descending document count; ties keep the alphabetical order of
/// their keys.
pub fn rank_topics(tags: &[Tag]) -> TopicIndex {
    let mut grouped: BTreeMap<String, RankedTopic> = BTreeMap::new();

    for tag in tags
        .iter()
        .filter(|t| !IGNORED_TOPIC_NAMES.contains(&t.name.as_str()))
    {
        let Some(value) = tag.value_str("value") else {
            continue;
        };
        let key = value.to_lowercase();
        let topic = grouped.entry(key.clone()).or_insert_with(|| RankedTopic {
            key,
            variants: BTreeSet::new(),
            documents: BTreeSet::new(),
        });
        topic.variants.insert(value.to_string());
        topic.documents.insert(tag.file_id.clone());
    }

    let mut topics: Vec<RankedTopic> = grouped.into_values().collect();
    // sort_by is stable, so equal counts stay in key order
    topics.sort_by(|a, b| b.documents.len().cmp(&a.documents.len()));
    TopicIndex { topics }
}

/// Title-case each whitespace-separated word
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filter: guest file tags of documents that have entity tags
pub fn guests_filter() -> TagFilter {
    TagFilter::FileTag
        .and(TagFilter::kind(KIND_GUEST))
        .and(TagFilter::same_file(TagFilter::kind(KIND_ENTITIES)))
}

/// Filter: entity block tags of documents that have a guest
pub fn topics_filter() -> TagFilter {
    TagFilter::BlockTag
        .and(TagFilter::kind(KIND_ENTITIES))
        .and(TagFilter::same_file(
            TagFilter::FileTag.and(TagFilter::kind(KIND_GUEST)),
        ))
}

fn topic_value_filter(topic: &RankedTopic) -> TagFilter {
    TagFilter::any_of(
        topic
            .variants
            .iter()
            .map(|v| TagFilter::value_equals("value", v.as_str()))
            .collect(),
    )
}

/// Filter: guest file tags of documents mentioning the topic
pub fn guests_by_topic_filter(topic: &RankedTopic) -> TagFilter {
    TagFilter::FileTag
        .and(TagFilter::kind(KIND_GUEST))
        .and(TagFilter::same_file(
            TagFilter::BlockTag
                .and(TagFilter::kind(KIND_ENTITIES))
                .and(topic_value_filter(topic)),
        ))
}

/// Filter: entity block tags for the topic in the guest's documents
pub fn entity_tags_filter(topic: &RankedTopic, guest: &str) -> TagFilter {
    TagFilter::BlockTag
        .and(TagFilter::kind(KIND_ENTITIES))
        .and(topic_value_filter(topic))
        .and(TagFilter::same_file(
            TagFilter::FileTag
                .and(TagFilter::kind(KIND_GUEST))
                .and(TagFilter::name(guest)),
        ))
}

/// Cached data access over a [`TagStore`]
pub struct DataAccess {
    store: Arc<dyn TagStore>,
    max_fetch_workers: usize,
    guests: TtlCache<(), Vec<Tag>>,
    topics: TtlCache<(), Arc<TopicIndex>>,
    documents: TtlCache<String, Arc<Document>>,
    guests_by_topic: TtlCache<String, Vec<Tag>>,
    entity_tags: TtlCache<(String, String), Vec<Tag>>,
}

impl DataAccess {
    pub fn new(
        store: Arc<dyn TagStore>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
        max_fetch_workers: usize,
    ) -> Self {
        Self {
            store,
            max_fetch_workers,
            guests: TtlCache::new(ttl, clock.clone()),
            topics: TtlCache::new(ttl, clock.clone()),
            documents: TtlCache::new(ttl, clock.clone()),
            guests_by_topic: TtlCache::new(ttl, clock.clone()),
            entity_tags: TtlCache::new(ttl, clock),
        }
    }

    /// Guests that appeared on the podcast
    pub async fn guests(&self) -> Result<Vec<Tag>> {
        self.guests
            .get_or_try_insert_with((), || async {
                self.store.query_tags(&guests_filter()).await
            })
            .await
    }

    /// Guest file tag by name
    pub async fn guest(&self, name: &str) -> Result<Tag> {
        self.guests()
            .await?
            .into_iter()
            .find(|g| g.name == name)
            .ok_or_else(|| Error::NotFound(format!("guest {}", name)))
    }

    /// Ranked topic index, pre-warming the document cache on a miss
    pub async fn topics(&self) -> Result<Arc<TopicIndex>> {
        self.topics
            .get_or_try_insert_with((), || self.load_topics())
            .await
    }

    async fn load_topics(&self) -> Result<Arc<TopicIndex>> {
        let tags = self.store.query_tags(&topics_filter()).await?;

        let document_ids: BTreeSet<String> = tags.iter().map(|t| t.file_id.clone()).collect();
        self.prefetch_documents(document_ids).await;

        let index = rank_topics(&tags);
        info!(
            entity_tags = tags.len(),
            topics = index.topics.len(),
            "Topic index loaded"
        );
        Ok(Arc::new(index))
    }

    /// Fetch documents concurrently into the cache
    ///
    /// Failures are logged and skipped: a document that failed here is
    /// fetched again on first use.
    pub async fn prefetch_documents(&self, ids: BTreeSet<String>) -> usize {
        let mut group: TaskGroup<String, Document, Error> = TaskGroup::new(self.max_fetch_workers);
        for id in ids {
            if self.documents.get(&id).await.is_some() {
                continue;
            }
            let store = Arc::clone(&self.store);
            let task_id = id.clone();
            group.spawn(id, async move { store.get_document(&task_id).await });
        }

        if group.is_empty() {
            return 0;
        }

        let mut loaded = 0;
        for outcome in group.join().await {
            match outcome.result {
                Ok(document) => {
                    self.documents.insert(outcome.key, Arc::new(document)).await;
                    loaded += 1;
                }
                Err(TaskError::Failed(e)) => {
                    warn!(file_id = %outcome.key, error = %e, "Document prefetch failed");
                }
                Err(TaskError::Aborted(reason)) => {
                    warn!(file_id = %outcome.key, reason = %reason, "Document prefetch aborted");
                }
            }
        }
        info!(documents = loaded, "Prefetched documents");
        loaded
    }

    /// Guests whose episodes mention the topic
    pub async fn guests_by_topic(&self, topic: &RankedTopic) -> Result<Vec<Tag>> {
        self.guests_by_topic
            .get_or_try_insert_with(topic.key.clone(), || async {
                self.store.query_tags(&guests_by_topic_filter(topic)).await
            })
            .await
    }

    /// Entity tags for the topic in the guest's episodes
    pub async fn entity_tags(&self, topic: &RankedTopic, guest: &str) -> Result<Vec<Tag>> {
        self.entity_tags
            .get_or_try_insert_with((topic.key.clone(), guest.to_string()), || async {
                self.store.query_tags(&entity_tags_filter(topic, guest)).await
            })
            .await
    }

    pub async fn document(&self, id: &str) -> Result<Arc<Document>> {
        self.documents
            .get_or_try_insert_with(id.to_string(), || async {
                self.store.get_document(id).await.map(Arc::new)
            })
            .await
    }

    /// Transcript span tags of a document
    pub async fn document_tags(&self, id: &str) -> Result<Vec<Tag>> {
        Ok(self.document(id).await?.transcript_tags().to_vec())
    }

    /// Source media URL of a document
    pub async fn media_url(&self, id: &str) -> Result<String> {
        self.document(id)
            .await?
            .media_url()
            .map(str::to_string)
            .ok_or_else(|| Error::NotFound(format!("media URL for document {}", id)))
    }

    /// Drop expired entries from every cache, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        self.guests.purge_expired().await
            + self.topics.purge_expired().await
            + self.documents.purge_expired().await
            + self.guests_by_topic.purge_expired().await
            + self.entity_tags.purge_expired().await
    }

    /// Per-token timing tags of a document, ordered by start offset
    pub async fn timestamp_tags(&self, id: &str) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = self
            .document(id)
            .await?
            .transcript_tags()
            .iter()
            .filter(|t| t.is_kind(KIND_TIMESTAMP))
            .cloned()
            .collect();
        tags.sort_by_key(|t| t.start_idx.unwrap_or(i64::MAX));
        Ok(tags)
    }
}
