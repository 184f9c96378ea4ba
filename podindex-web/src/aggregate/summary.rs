//! Episode summaries: topic hashtags and chapters

use podindex_common::tag::{KIND_CHAPTER, KIND_TOPIC_SUMMARY};
use podindex_common::Tag;
use std::cmp::Ordering;

use super::clips::deep_link;

/// Topics at or below this relevance are not shown as hashtags
pub const HASHTAG_MIN_RELEVANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub name: String,
    pub gist: String,
    pub summary: String,
    pub start_secs: i64,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeSummary {
    /// Without the leading `#`, most relevant first
    pub hashtags: Vec<String>,
    pub chapters: Vec<Chapter>,
}

/// Last segment of a `>`-separated topic path
fn hashtag(name: &str) -> String {
    name.rsplit('>').next().unwrap_or(name).trim().to_string()
}

pub fn summarize(media_url: &str, tags: &[Tag]) -> EpisodeSummary {
    let mut topics: Vec<(&Tag, f64)> = tags
        .iter()
        .filter(|t| t.is_kind(KIND_TOPIC_SUMMARY))
        .filter_map(|t| t.value_f64("relevance").map(|r| (t, r)))
        .collect();
    topics.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let hashtags = topics
        .into_iter()
        .filter(|(_, relevance)| *relevance > HASHTAG_MIN_RELEVANCE)
        .map(|(tag, _)| hashtag(&tag.name))
        .filter(|h| !h.is_empty())
        .collect();

    let mut chapter_tags: Vec<&Tag> = tags.iter().filter(|t| t.is_kind(KIND_CHAPTER)).collect();
    chapter_tags.sort_by_key(|t| t.start_idx.unwrap_or(0));

    let chapters = chapter_tags
        .into_iter()
        .map(|tag| {
            let start_secs = tag.start_secs().unwrap_or(0);
            Chapter {
                name: tag.name.clone(),
                gist: tag.value_str("gist").unwrap_or_default().to_string(),
                summary: tag.value_str("summary").unwrap_or_default().to_string(),
                start_secs,
                url: deep_link(media_url, start_secs),
            }
        })
        .collect();

    EpisodeSummary { hashtags, chapters }
}
