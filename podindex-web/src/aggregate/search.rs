//! Phrase search over per-token timestamp tags
//!
//! A fragment starts at every token equal to the first search term. The
//! window of `10 + n_terms` tokens from there must contain exactly `n_terms`
//! tokens that are search terms.

use podindex_common::Tag;

use super::clips::deep_link;

const WINDOW_BASE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub start_secs: i64,
    /// Tokens of the matched window joined by spaces
    pub text: String,
    pub url: String,
}

/// Lower-cased, whitespace-separated terms of a query
pub fn search_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

fn fragment_start(tag: &Tag) -> i64 {
    tag.value_f64("start_time")
        .map(|secs| secs as i64)
        .or_else(|| tag.start_secs())
        .unwrap_or(0)
}

/// Fragments of the transcript matching the terms, ordered by start
///
/// `timestamp_tags` must already be in transcript order.
pub fn find_fragments(media_url: &str, timestamp_tags: &[Tag], terms: &[String]) -> Vec<Fragment> {
    let Some(first) = terms.first() else {
        return Vec::new();
    };
    let window = WINDOW_BASE + terms.len();

    let mut fragments: Vec<Fragment> = timestamp_tags
        .iter()
        .enumerate()
        .filter(|(_, tag)| tag.name.to_lowercase() == *first)
        .filter_map(|(ix, tag)| {
            let tokens = &timestamp_tags[ix..(ix + window).min(timestamp_tags.len())];
            let hits = tokens
                .iter()
                .filter(|t| terms.contains(&t.name.to_lowercase()))
                .count();
            if hits != terms.len() {
                return None;
            }

            let start_secs = fragment_start(tag);
            Some(Fragment {
                start_secs,
                text: tokens
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
                url: deep_link(media_url, start_secs),
            })
        })
        .collect();

    fragments.sort_by_key(|f| f.start_secs);
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transcript(words: &str) -> Vec<Tag> {
        words
            .split(' ')
            .enumerate()
            .map(|(i, w)| {
                serde_json::from_value(json!({
                    "kind": "timestamp",
                    "name": w,
                    "value": {"start_time": format!("{}.4", i * 2)},
                    "startIdx": i * 2000,
                    "endIdx": i * 2000 + 1500
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_search_terms_lowercased() {
        assert_eq!(search_terms("  Mars  Colony "), vec!["mars", "colony"]);
        assert!(search_terms("   ").is_empty());
    }

    #[test]
    fn test_phrase_found_within_window() {
        let tags = transcript("we should build a colony on Mars soon because the Mars colony matters");
        let terms = search_terms("mars colony");

        let fragments = find_fragments("https://youtu.be/abc", &tags, &terms);
        // "Mars" at token 6 sees "Mars" again at 10 and "colony" at 11 (3 hits);
        // "Mars" at token 10 sees only "Mars colony" (2 hits)
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].start_secs, 20);
        assert_eq!(fragments[0].url, "https://youtu.be/abc?t=20");
        assert!(fragments[0].text.starts_with("Mars colony matters"));
    }

    #[test]
    fn test_no_fragments_without_terms_or_match() {
        let tags = transcript("hello there");
        assert!(find_fragments("u", &tags, &[]).is_empty());
        assert!(find_fragments("u", &tags, &search_terms("mars")).is_empty());
    }

    #[test]
    fn test_single_term_needs_exact_hit_count() {
        let tags = transcript("mars is red and mars is cold");
        let fragments = find_fragments("u", &tags, &search_terms("Mars"));
        // each window holds both occurrences except the last one
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].start_secs, 8);
    }
}
