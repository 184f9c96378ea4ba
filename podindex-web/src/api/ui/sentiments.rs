//! Sentiments page - what a guest feels good or bad about

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use std::collections::BTreeSet;

use super::layout::escape_html;
use super::widgets::{clip_report, form, radio, Choice};
use super::{admit_billable, chosen, pick, select_episode, Admission};
use crate::aggregate::styles::sentiment_label;
use crate::aggregate::{build_clips, names_in_sentiment, sentiment_options};
use crate::error::PageResult;
use crate::AppState;

const TITLE: &str = "Sentiments";
const SUBTITLE: &str = "Let's see what the guests feel sad or happy about.";

#[derive(Debug, Deserialize)]
pub struct SentimentsQuery {
    guest: Option<String>,
    sentiment: Option<String>,
}

/// GET /sentiments
pub async fn sentiments_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SentimentsQuery>,
) -> PageResult<Response> {
    let visitor = match admit_billable(&state, &headers).await? {
        Admission::Admitted(visitor) => visitor,
        Admission::Halted(response) => return Ok(response),
    };

    let mut fields = Vec::new();
    let Some(episode) = select_episode(&state, chosen(&query.guest), &mut fields).await? else {
        let body = format!("{}<p>Please select a guest.</p>", form("/sentiments", &fields));
        return Ok(visitor.page(&state, TITLE, SUBTITLE, &body));
    };

    let options: Vec<Choice> = sentiment_options(&episode.tags)
        .into_iter()
        .map(|name| {
            let label = sentiment_label(&name);
            (name, label)
        })
        .collect();
    let sentiment = pick(&options, chosen(&query.sentiment), "sentiment")?;
    fields.push(radio("sentiment", "Sentiment", &options, sentiment));

    let mut body = form("/sentiments", &fields);
    let Some(sentiment) = sentiment else {
        body.push_str("<p>No sentiments were detected in this episode.</p>");
        return Ok(visitor.page(&state, TITLE, SUBTITLE, &body));
    };

    let names = names_in_sentiment(&episode.tags, sentiment);
    let distinct: BTreeSet<&str> = names.iter().map(|t| t.display_value()).collect();

    body.push_str(&format!(
        "<p>{} feels {} about the following topics:</p><ul>{}</ul>",
        escape_html(&episode.guest),
        escape_html(&sentiment_label(sentiment)),
        distinct
            .iter()
            .map(|name| format!("<li>{}</li>", escape_html(name)))
            .collect::<String>()
    ));

    let report = build_clips(&episode.media_url, &names, &episode.tags);
    body.push_str(&clip_report(&report));
    Ok(visitor.page(&state, TITLE, SUBTITLE, &body))
}
