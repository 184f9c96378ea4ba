//! One indexed episode: guest, media link and a small transcript

use podindex_common::{Document, Tag};
use serde_json::{json, Value};

pub const EPISODE_ID: &str = "ep1";
pub const GUEST: &str = "Elon Musk";
pub const MEDIA_URL: &str = "https://youtu.be/abc";

fn tag(value: Value) -> Tag {
    serde_json::from_value(value).unwrap()
}

fn span(kind: &str, name: &str, value: Value, start: i64, end: i64) -> Tag {
    tag(json!({
        "fileId": EPISODE_ID,
        "blockId": "b1",
        "kind": kind,
        "name": name,
        "value": value,
        "startIdx": start,
        "endIdx": end
    }))
}

pub fn guest_tag() -> Tag {
    tag(json!({"fileId": EPISODE_ID, "kind": "guest", "name": GUEST}))
}

/// Entity tags of the episode, as returned by the topic query
pub fn topic_entity_tags() -> Vec<Tag> {
    vec![
        span("entities", "location", json!({"value": "Mars"}), 12000, 15000),
        span("entities", "organization", json!({"value": "Tesla"}), 40000, 41000),
    ]
}

fn timestamp_tags() -> Vec<Tag> {
    "we will build a colony on Mars"
        .split(' ')
        .enumerate()
        .map(|(i, word)| {
            let start = 20000 + i as i64 * 500;
            span(
                "timestamp",
                word,
                json!({"start_time": format!("{}", start / 1000)}),
                start,
                start + 400,
            )
        })
        .collect()
}

pub fn transcript_tags() -> Vec<Tag> {
    let mut tags = topic_entity_tags();
    tags.extend([
        span("sentiments", "POSITIVE", json!({}), 11000, 16000),
        span("sentiments", "NEGATIVE", json!({}), 39000, 42000),
        span("emotions", "happiness", json!({}), 11500, 15500),
        span("speaker", "spk_1", json!({}), 0, 60000),
        span("names", "Mars", json!({"value": "Mars"}), 12500, 13500),
        span("names", "Twitter", json!({"value": "Twitter"}), 39500, 40500),
        span(
            "chapter",
            "1",
            json!({"gist": "Going to Mars", "summary": "The plan for a Mars colony."}),
            0,
            30000,
        ),
        span(
            "chapter",
            "2",
            json!({"gist": "Electric cars", "summary": "How Tesla started."}),
            30000,
            60000,
        ),
        span("topic_summary", "Science>Space", json!({"relevance": 0.8}), 0, 60000),
        span("topic_summary", "Sports", json!({"relevance": 0.3}), 0, 60000),
    ]);
    tags.extend(timestamp_tags());
    tags
}

pub fn episode_document() -> Document {
    serde_json::from_value(json!({
        "id": EPISODE_ID,
        "blocks": [{"id": "b1", "text": "transcript", "tags": transcript_tags()}],
        "tags": [
            {"fileId": EPISODE_ID, "kind": "youtube_url", "name": MEDIA_URL},
            {"fileId": EPISODE_ID, "kind": "guest", "name": GUEST}
        ]
    }))
    .unwrap()
}
