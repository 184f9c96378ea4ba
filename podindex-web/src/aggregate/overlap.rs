//! Span overlap between a target tag and the rest of a transcript's tags
//!
//! A candidate overlaps a target when the candidate starts before the target
//! ends and ends after the target starts, both loosened by a slack of the
//! target name's character length. A missing offset on the candidate is
//! unbounded on that side, so document-wide tags overlap everything.

use podindex_common::tag::{
    KIND_ARTICLE_TOPICS, KIND_EMOTIONS, KIND_ENTITIES, KIND_SENTIMENTS, KIND_SPEAKER,
    KIND_TIMESTAMP,
};
use podindex_common::Tag;
use std::collections::BTreeMap;

use super::styles::{
    emotion_label, sentiment_label, style_label, NEUTRAL_SENTIMENT, UNKNOWN_EMOTION,
    UNKNOWN_SPEAKER,
};

/// Kinds never counted as overlapping context
pub const EXCLUDED_KINDS: [&str; 3] = [KIND_ENTITIES, KIND_ARTICLE_TOPICS, KIND_TIMESTAMP];

fn slack(target: &Tag) -> i64 {
    target.name.chars().count() as i64
}

/// True iff `candidate` is context for `target`
pub fn overlaps(target: &Tag, candidate: &Tag) -> bool {
    if EXCLUDED_KINDS.contains(&candidate.kind.as_str()) {
        return false;
    }

    let slack = slack(target);
    let target_start = target.start_idx.unwrap_or(i64::MIN);
    let target_end = target.end_idx.unwrap_or(i64::MAX);

    let starts_before_end = candidate
        .start_idx
        .map_or(true, |start| start <= target_end.saturating_add(slack));
    let ends_after_start = candidate
        .end_idx
        .map_or(true, |end| end >= target_start.saturating_sub(slack));

    starts_before_end && ends_after_start
}

/// Overlapping tags' display labels grouped by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagBuckets {
    buckets: BTreeMap<String, Vec<String>>,
}

impl TagBuckets {
    /// Labels of one kind, in transcript tag order
    pub fn get(&self, kind: &str) -> &[String] {
        self.buckets.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn first(&self, kind: &str) -> &str {
        self.get(kind).first().map(String::as_str).unwrap_or_default()
    }

    pub fn emotion(&self) -> &str {
        self.first(KIND_EMOTIONS)
    }

    pub fn sentiment(&self) -> &str {
        self.first(KIND_SENTIMENTS)
    }

    pub fn speaker(&self) -> &str {
        self.first(KIND_SPEAKER)
    }

    fn push(&mut self, kind: &str, label: String) {
        self.buckets.entry(kind.to_string()).or_default().push(label);
    }

    fn default_if_empty(&mut self, kind: &str, label: String) {
        let bucket = self.buckets.entry(kind.to_string()).or_default();
        if bucket.is_empty() {
            bucket.push(label);
        }
    }
}

/// Bucket every tag overlapping `target` by kind
///
/// Emotion, sentiment and speaker buckets get a default label iff no tag
/// of that kind overlaps.
pub fn bucket_overlapping(target: &Tag, tags: &[Tag]) -> TagBuckets {
    let mut buckets = TagBuckets::default();

    for tag in tags.iter().filter(|t| overlaps(target, t)) {
        buckets.push(&tag.kind, style_label(&tag.kind, &tag.name));
    }

    buckets.default_if_empty(KIND_EMOTIONS, emotion_label(UNKNOWN_EMOTION));
    buckets.default_if_empty(KIND_SENTIMENTS, sentiment_label(NEUTRAL_SENTIMENT));
    buckets.default_if_empty(KIND_SPEAKER, UNKNOWN_SPEAKER.to_string());
    buckets
}
