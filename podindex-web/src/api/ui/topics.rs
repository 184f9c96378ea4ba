//! Topics page - what guests say about a ranked topic

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::layout::escape_html;
use super::widgets::{clip_report, form, select, Choice};
use super::{admit_billable, chosen, guest_choices, pick, Admission};
use crate::aggregate::{build_clips, resolve_topic_targets, ClipReport};
use crate::error::{PageError, PageResult};
use crate::AppState;

const TITLE: &str = "Topics";
const SUBTITLE: &str = "Let's find out what the guests say about your favorite topics.";

#[derive(Debug, Deserialize)]
pub struct TopicsQuery {
    topic: Option<String>,
    guest: Option<String>,
}

/// GET /topics
pub async fn topics_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TopicsQuery>,
) -> PageResult<Response> {
    let visitor = match admit_billable(&state, &headers).await? {
        Admission::Admitted(visitor) => visitor,
        Admission::Halted(response) => return Ok(response),
    };

    let index = state.data.topics().await?;
    let topic_choices: Vec<Choice> = index
        .topics
        .iter()
        .map(|t| {
            (
                t.key.clone(),
                format!("{} ({} episodes)", t.title(), t.documents.len()),
            )
        })
        .collect();

    let mut fields = Vec::new();
    let Some(topic_key) = pick(&topic_choices, chosen(&query.topic), "topic")? else {
        let body = "<p>No topics have been indexed yet.</p>";
        return Ok(visitor.page(&state, TITLE, SUBTITLE, body));
    };
    fields.push(select("topic", "Topic", &topic_choices, Some(topic_key)));

    let topic = index
        .get(topic_key)
        .ok_or_else(|| PageError::NotFound(format!("topic {}", topic_key)))?;

    let guests = state.data.guests_by_topic(topic).await?;
    let guest_options = guest_choices(&guests);
    let guest = pick(&guest_options, chosen(&query.guest), "guest")?;
    fields.push(select("guest", "Guest", &guest_options, guest));

    let mut body = form("/topics", &fields);
    let Some(guest) = guest else {
        body.push_str("<p>Please select a guest.</p>");
        return Ok(visitor.page(&state, TITLE, SUBTITLE, &body));
    };

    // one report per episode, merged in episode order
    let entity_tags = state.data.entity_tags(topic, guest).await?;
    let mut by_document: BTreeMap<&str, Vec<_>> = BTreeMap::new();
    for tag in &entity_tags {
        by_document
            .entry(tag.file_id.as_str())
            .or_default()
            .push(tag.clone());
    }

    let mut report = ClipReport::default();
    for (file_id, tags) in by_document {
        let media_url = state.data.media_url(file_id).await?;
        let transcript = state.data.document_tags(file_id).await?;
        let targets = resolve_topic_targets(&tags, &[topic.key.clone()]);
        report.merge(build_clips(&media_url, &targets, &transcript));
    }

    body.push_str(&format!(
        "<p>{} clips mentioning {}</p>",
        report.clips.len(),
        escape_html(&topic.title())
    ));
    body.push_str(&clip_report(&report));
    Ok(visitor.page(&state, TITLE, SUBTITLE, &body))
}
