//! TLDR page - episode hashtags and chapter summaries

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;

use super::layout::escape_html;
use super::widgets::form;
use super::{admit_billable, chosen, select_episode, Admission};
use crate::aggregate::summarize;
use crate::error::PageResult;
use crate::AppState;

const TITLE: &str = "TLDR";
const SUBTITLE: &str = "Get the insights of your favorite guests in 5 minutes instead of 3 hours.";

#[derive(Debug, Deserialize)]
pub struct TldrQuery {
    guest: Option<String>,
}

/// GET /tldr
pub async fn tldr_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TldrQuery>,
) -> PageResult<Response> {
    let visitor = match admit_billable(&state, &headers).await? {
        Admission::Admitted(visitor) => visitor,
        Admission::Halted(response) => return Ok(response),
    };

    let mut fields = Vec::new();
    let episode = select_episode(&state, chosen(&query.guest), &mut fields).await?;
    let mut body = form("/tldr", &fields);
    let Some(episode) = episode else {
        body.push_str("<p>Please select a guest.</p>");
        return Ok(visitor.page(&state, TITLE, SUBTITLE, &body));
    };

    let summary = summarize(&episode.media_url, &episode.tags);

    if !summary.hashtags.is_empty() {
        let hashtags: Vec<String> = summary
            .hashtags
            .iter()
            .map(|h| format!("#{}", escape_html(h)))
            .collect();
        body.push_str(&format!("<h4 class=\"hashtags\">{}</h4>", hashtags.join(" ")));
    }

    if summary.chapters.is_empty() {
        body.push_str("<p>No chapters for this episode.</p>");
    }
    for chapter in &summary.chapters {
        body.push_str(&format!(
            "<div class=\"clip\"><h3>Chapter {}: {}</h3><p>{}</p><p><a href=\"{url}\" target=\"_blank\">{url}</a></p></div>",
            escape_html(&chapter.name),
            escape_html(&chapter.gist),
            escape_html(&chapter.summary),
            url = escape_html(&chapter.url)
        ));
    }

    Ok(visitor.page(&state, TITLE, SUBTITLE, &body))
}
