//! Tag store data model
//!
//! Tags, blocks and documents as returned by the remote tag store. Offsets on
//! transcript tags are milliseconds into the source media. Everything here is
//! read-only once fetched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Tag kind for guest identity file tags
pub const KIND_GUEST: &str = "guest";
/// Tag kind for named entities mentioned in a transcript
pub const KIND_ENTITIES: &str = "entities";
/// Tag kind for person/topic names
pub const KIND_NAMES: &str = "names";
/// Tag kind for per-token timing tags
pub const KIND_TIMESTAMP: &str = "timestamp";
/// Tag kind for the source media link
pub const KIND_YOUTUBE_URL: &str = "youtube_url";
pub const KIND_SENTIMENTS: &str = "sentiments";
pub const KIND_EMOTIONS: &str = "emotions";
pub const KIND_SPEAKER: &str = "speaker";
pub const KIND_CHAPTER: &str = "chapter";
pub const KIND_TOPIC_SUMMARY: &str = "topic_summary";
pub const KIND_ARTICLE_TOPICS: &str = "article-topics";

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Annotation on a text span or on a whole document
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default)]
    pub id: Option<String>,
    /// Owning document
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_id: String,
    /// Owning block, absent for file-level tags
    #[serde(default)]
    pub block_id: Option<String>,
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Free-form attributes (value, relevance, gist, summary, start_time, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: Map<String, Value>,
    #[serde(default)]
    pub start_idx: Option<i64>,
    #[serde(default)]
    pub end_idx: Option<i64>,
}

impl Tag {
    /// String attribute from the value mapping
    pub fn value_str(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(Value::as_str)
    }

    /// Numeric attribute from the value mapping; numeric strings are accepted
    pub fn value_f64(&self, key: &str) -> Option<f64> {
        match self.value.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Human-facing title: `value["value"]`, falling back to the tag name
    pub fn display_value(&self) -> &str {
        self.value_str("value").unwrap_or(&self.name)
    }

    /// Start offset in whole seconds (milliseconds integer-divided by 1000)
    pub fn start_secs(&self) -> Option<i64> {
        self.start_idx.map(|ms| ms / 1000)
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

/// Contiguous span of transcript text with its own tags
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

/// Transcript document ("file" in the tag store)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocks: Vec<Block>,
    /// File-level tags (media URL, guest identity, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

impl Document {
    /// Span tags of the transcript, carried by the first block
    pub fn transcript_tags(&self) -> &[Tag] {
        self.blocks.first().map(|b| b.tags.as_slice()).unwrap_or(&[])
    }

    /// Source media URL from the `youtube_url` file tag
    pub fn media_url(&self) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.is_kind(KIND_YOUTUBE_URL))
            .map(|t| t.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_deserializes_camel_case() {
        let tag: Tag = serde_json::from_value(json!({
            "id": "t1",
            "fileId": "f1",
            "blockId": "b1",
            "kind": "entities",
            "name": "location",
            "value": {"value": "Mars"},
            "startIdx": 12000,
            "endIdx": 15000
        }))
        .unwrap();

        assert_eq!(tag.file_id, "f1");
        assert_eq!(tag.display_value(), "Mars");
        assert_eq!(tag.start_secs(), Some(12));
        assert_eq!(tag.end_idx, Some(15000));
    }

    #[test]
    fn test_file_tag_without_offsets() {
        let tag: Tag = serde_json::from_value(json!({
            "fileId": "f1",
            "kind": "guest",
            "name": "Elon Musk"
        }))
        .unwrap();

        assert!(tag.start_idx.is_none());
        assert!(tag.value.is_empty());
        assert_eq!(tag.display_value(), "Elon Musk");
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let sentiment: Tag = serde_json::from_value(json!({
            "fileId": "f1",
            "kind": "sentiments",
            "name": "POSITIVE",
            "value": null,
            "startIdx": 11000,
            "endIdx": 16000
        }))
        .unwrap();
        assert!(sentiment.value.is_empty());
        assert_eq!(sentiment.display_value(), "POSITIVE");

        let speaker: Tag = serde_json::from_value(json!({
            "fileId": null,
            "kind": "speaker",
            "name": null,
            "value": {"confidence": 0.9}
        }))
        .unwrap();
        assert_eq!(speaker.name, "");
        assert_eq!(speaker.file_id, "");

        let doc: Document = serde_json::from_value(json!({
            "id": "f1",
            "blocks": [{"text": null, "tags": null}],
            "tags": null
        }))
        .unwrap();
        assert!(doc.transcript_tags().is_empty());
        assert_eq!(doc.media_url(), None);
    }

    #[test]
    fn test_value_f64_accepts_numeric_strings() {
        let tag: Tag = serde_json::from_value(json!({
            "kind": "timestamp",
            "name": "mars",
            "value": {"start_time": "12.5", "relevance": 0.7}
        }))
        .unwrap();

        assert_eq!(tag.value_f64("start_time"), Some(12.5));
        assert_eq!(tag.value_f64("relevance"), Some(0.7));
        assert_eq!(tag.value_f64("missing"), None);
    }

    #[test]
    fn test_document_accessors() {
        let doc: Document = serde_json::from_value(json!({
            "id": "f1",
            "blocks": [{"text": "hello", "tags": [{"kind": "speaker", "name": "spk_1"}]}],
            "tags": [
                {"kind": "youtube_url", "name": "https://youtu.be/abc"},
                {"kind": "guest", "name": "Elon Musk"}
            ]
        }))
        .unwrap();

        assert_eq!(doc.media_url(), Some("https://youtu.be/abc"));
        assert_eq!(doc.transcript_tags().len(), 1);
    }
}
