//! Tag aggregation
//!
//! Pure functions over fetched tags: span overlap, per-kind bucketing,
//! clip construction, episode summaries and phrase search. Nothing here
//! talks to the network.

pub mod clips;
pub mod overlap;
pub mod search;
pub mod sentiment;
pub mod styles;
pub mod summary;

pub use clips::{build_clips, deep_link, resolve_topic_targets, Clip, ClipReport, Tally};
pub use overlap::{bucket_overlapping, overlaps, TagBuckets, EXCLUDED_KINDS};
pub use search::{find_fragments, search_terms, Fragment};
pub use sentiment::{names_in_sentiment, sentiment_options};
pub use summary::{summarize, Chapter, EpisodeSummary};
