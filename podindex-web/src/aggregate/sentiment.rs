//! Names mentioned inside spans of a given sentiment

use podindex_common::tag::{KIND_NAMES, KIND_SENTIMENTS};
use podindex_common::Tag;
use std::collections::{BTreeMap, BTreeSet};

/// Distinct raw sentiment names present in the transcript
pub fn sentiment_options(tags: &[Tag]) -> Vec<String> {
    tags.iter()
        .filter(|t| t.is_kind(KIND_SENTIMENTS))
        .map(|t| t.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn contains(outer: &Tag, inner: &Tag) -> bool {
    match (outer.start_idx, outer.end_idx, inner.start_idx, inner.end_idx) {
        (Some(os), Some(oe), Some(is), Some(ie)) => is >= os && ie <= oe,
        _ => false,
    }
}

/// `names` tags fully contained in a span tagged with `sentiment`
///
/// Sentiment spans are taken one per start offset in order, and names are
/// listed span by span.
pub fn names_in_sentiment(tags: &[Tag], sentiment: &str) -> Vec<Tag> {
    let spans: BTreeMap<i64, &Tag> = tags
        .iter()
        .filter(|t| t.is_kind(KIND_SENTIMENTS) && t.name == sentiment)
        .map(|t| (t.start_idx.unwrap_or(0), t))
        .collect();

    spans
        .values()
        .flat_map(|span| {
            tags.iter()
                .filter(move |t| t.is_kind(KIND_NAMES) && contains(span, t))
        })
        .cloned()
        .collect()
}
