//! Entities page - clips for entities picked from one episode

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use podindex_common::tag::KIND_ENTITIES;
use std::collections::BTreeSet;

use super::widgets::{clip_report, form, multi_select, Choice};
use super::{admit_billable, select_episode, Admission};
use crate::aggregate::{build_clips, resolve_topic_targets};
use crate::data::title_case;
use crate::error::PageResult;
use crate::AppState;

const TITLE: &str = "Entities";
const SUBTITLE: &str = "Let's find out what the guests say about specific topics.";

/// GET /entities
///
/// Query: `guest`, plus one `topic` per selected entity.
pub async fn entities_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> PageResult<Response> {
    let visitor = match admit_billable(&state, &headers).await? {
        Admission::Admitted(visitor) => visitor,
        Admission::Halted(response) => return Ok(response),
    };

    let guest = params
        .iter()
        .find(|(k, v)| k == "guest" && !v.trim().is_empty())
        .map(|(_, v)| v.trim());
    let selected: Vec<String> = params
        .iter()
        .filter(|(k, v)| k == "topic" && !v.trim().is_empty())
        .map(|(_, v)| v.trim().to_lowercase())
        .collect();

    let mut fields = Vec::new();
    let episode = select_episode(&state, guest, &mut fields).await?;
    let Some(episode) = episode else {
        let body = format!("{}<p>Please select a guest.</p>", form("/entities", &fields));
        return Ok(visitor.page(&state, TITLE, SUBTITLE, &body));
    };

    let values: BTreeSet<String> = episode
        .tags
        .iter()
        .filter(|t| t.is_kind(KIND_ENTITIES))
        .filter_map(|t| t.value_str("value"))
        .map(str::to_lowercase)
        .collect();
    let options: Vec<Choice> = values
        .into_iter()
        .map(|v| {
            let label = title_case(&v);
            (v, label)
        })
        .collect();
    fields.push(multi_select("topic", "Topic", &options, &selected));

    let mut body = form("/entities", &fields);
    if selected.is_empty() {
        body.push_str("<p>Pick one or more topics.</p>");
    } else {
        let targets = resolve_topic_targets(&episode.tags, &selected);
        let report = build_clips(&episode.media_url, &targets, &episode.tags);
        body.push_str(&clip_report(&report));
    }

    Ok(visitor.page(&state, TITLE, SUBTITLE, &body))
}
