//! Display labels for emotion and sentiment tag names

use podindex_common::tag::{KIND_EMOTIONS, KIND_SENTIMENTS};

pub const UNKNOWN_EMOTION: &str = "unknown";
pub const NEUTRAL_SENTIMENT: &str = "NEUTRAL";
pub const UNKNOWN_SPEAKER: &str = "unknown";

pub fn emotion_label(name: &str) -> String {
    match name {
        "happiness" => "Happy",
        "anger" => "Angry",
        UNKNOWN_EMOTION => "Not sure",
        other => other,
    }
    .to_string()
}

pub fn sentiment_label(name: &str) -> String {
    match name {
        "POS" | "POSITIVE" => "Positive",
        "NEG" | "NEGATIVE" => "Negative",
        NEUTRAL_SENTIMENT => "Neutral",
        other => other,
    }
    .to_string()
}

/// Label for a tag name of the given kind; unstyled kinds keep the raw name
pub fn style_label(kind: &str, name: &str) -> String {
    match kind {
        KIND_EMOTIONS => emotion_label(name),
        KIND_SENTIMENTS => sentiment_label(name),
        _ => name.to_string(),
    }
}
