//! Clip lists and label distributions

use podindex_common::tag::{KIND_EMOTIONS, KIND_ENTITIES, KIND_SENTIMENTS, KIND_SPEAKER};
use podindex_common::Tag;
use std::collections::BTreeMap;

use super::overlap::bucket_overlapping;

/// Deep link into one moment of a media item
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub title: String,
    pub emotion: String,
    pub sentiment: String,
    pub speaker: String,
    pub start_secs: i64,
    pub url: String,
}

/// Label counts, most common first
///
/// Labels with equal counts keep the order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    counts: Vec<(String, usize)>,
}

impl Tally {
    pub fn add(&mut self, label: &str) {
        match self.counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label.to_string(), 1)),
        }
    }

    pub fn merge(&mut self, other: &Tally) {
        for (label, count) in &other.counts {
            match self.counts.iter_mut().find(|(l, _)| l == label) {
                Some((_, existing)) => *existing += count,
                None => self.counts.push((label.clone(), *count)),
            }
        }
    }

    pub fn entries(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> =
            self.counts.iter().map(|(l, c)| (l.as_str(), *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Clips plus the label distribution across all of them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipReport {
    pub clips: Vec<Clip>,
    pub sentiments: Tally,
    pub emotions: Tally,
    pub speakers: Tally,
}

impl ClipReport {
    pub fn merge(&mut self, other: ClipReport) {
        self.clips.extend(other.clips);
        self.sentiments.merge(&other.sentiments);
        self.emotions.merge(&other.emotions);
        self.speakers.merge(&other.speakers);
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// `{media_url}?t={secs}`, or `&t=` when the URL already carries a query
pub fn deep_link(media_url: &str, start_secs: i64) -> String {
    let separator = if media_url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", media_url, separator, start_secs)
}

/// Entity tags naming any of `topics`, one per start offset, in order
///
/// Topics are compared lower-cased against both the tag's value and its
/// name. When two tags share a start offset the later one wins.
pub fn resolve_topic_targets(tags: &[Tag], topics: &[String]) -> Vec<Tag> {
    let topics: Vec<String> = topics.iter().map(|t| t.to_lowercase()).collect();
    let mut by_start: BTreeMap<i64, &Tag> = BTreeMap::new();

    for tag in tags.iter().filter(|t| t.is_kind(KIND_ENTITIES)) {
        let value = tag.value_str("value").map(str::to_lowercase);
        let name = tag.name.to_lowercase();
        let selected = topics
            .iter()
            .any(|t| value.as_deref() == Some(t.as_str()) || *t == name);
        if selected {
            by_start.insert(tag.start_idx.unwrap_or(0), tag);
        }
    }

    by_start.into_values().cloned().collect()
}

/// One clip per target, labelled from the transcript tags overlapping it
pub fn build_clips(media_url: &str, targets: &[Tag], tags: &[Tag]) -> ClipReport {
    let mut report = ClipReport::default();

    for target in targets {
        let buckets = bucket_overlapping(target, tags);

        for label in buckets.get(KIND_SENTIMENTS) {
            report.sentiments.add(label);
        }
        for label in buckets.get(KIND_EMOTIONS) {
            report.emotions.add(label);
        }
        for label in buckets.get(KIND_SPEAKER) {
            report.speakers.add(label);
        }

        let start_secs = target.start_secs().unwrap_or(0);
        report.clips.push(Clip {
            title: target.display_value().to_string(),
            emotion: buckets.emotion().to_string(),
            sentiment: buckets.sentiment().to_string(),
            speaker: buckets.speaker().to_string(),
            start_secs,
            url: deep_link(media_url, start_secs),
        });
    }

    report
}
