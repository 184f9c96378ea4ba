//! Search page - find where a phrase was said

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;

use super::widgets::{form, fragment_list, text_input};
use super::{admit_billable, chosen, select_episode, Admission};
use crate::aggregate::{find_fragments, search_terms};
use crate::error::{PageError, PageResult};
use crate::AppState;

const TITLE: &str = "Search";
const SUBTITLE: &str = "Let's scan the brains of the guests.";

/// Longest search phrase accepted, in characters
pub const MAX_QUERY_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    guest: Option<String>,
    q: Option<String>,
}

/// GET /search
pub async fn search_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> PageResult<Response> {
    // rejected before the visit is billed
    if let Some(q) = &query.q {
        if q.chars().count() > MAX_QUERY_CHARS {
            return Err(PageError::BadRequest(format!(
                "search query longer than {} characters",
                MAX_QUERY_CHARS
            )));
        }
    }

    let visitor = match admit_billable(&state, &headers).await? {
        Admission::Admitted(visitor) => visitor,
        Admission::Halted(response) => return Ok(response),
    };

    let mut fields = Vec::new();
    let episode = select_episode(&state, chosen(&query.guest), &mut fields).await?;
    let text = chosen(&query.q).unwrap_or_default();
    fields.push(text_input("q", "Search query", text));

    let mut body = form("/search", &fields);
    let Some(episode) = episode else {
        body.push_str("<p>Please select a guest.</p>");
        return Ok(visitor.page(&state, TITLE, SUBTITLE, &body));
    };

    let terms = search_terms(text);
    if !terms.is_empty() {
        let timestamps = state.data.timestamp_tags(&episode.file_id).await?;
        let fragments = find_fragments(&episode.media_url, &timestamps, &terms);
        body.push_str(&fragment_list(&fragments));
    }

    Ok(visitor.page(&state, TITLE, SUBTITLE, &body))
}
