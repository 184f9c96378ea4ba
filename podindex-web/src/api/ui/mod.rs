//! UI routes - server-rendered HTML pages
//!
//! - **Home** (`home`): introduction and the OAuth redirect target
//! - **Topics** (`topics`): clips for a ranked topic in one guest's episodes
//! - **Sentiments** (`sentiments`): names a guest mentions with a given sentiment
//! - **TLDR** (`tldr`): hashtags and chapter summaries of an episode
//! - **Search** (`search`): phrase search over the word-level transcript
//! - **Entities** (`entities`): clips for hand-picked entities of an episode
//!
//! Every page but Home is billable: it counts against the caller's usage
//! quota before any results are rendered.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use podindex_common::Tag;
use std::collections::BTreeSet;
use tracing::info;

use crate::auth::{clear_session_cookie, AuthOutcome, RequestContext};
use crate::error::{PageError, PageResult};
use crate::AppState;

pub mod layout;
pub mod widgets;

mod entities;
mod home;
mod search;
mod sentiments;
mod tldr;
mod topics;

use entities::entities_page;
use home::home_page;
use layout::{render_login_prompt, render_page, render_quota_exceeded, SidebarStatus};
use search::search_page;
use sentiments::sentiments_page;
use tldr::tldr_page;
use topics::topics_page;
use widgets::Choice;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/topics", get(topics_page))
        .route("/sentiments", get(sentiments_page))
        .route("/tldr", get(tldr_page))
        .route("/search", get(search_page))
        .route("/entities", get(entities_page))
        .route("/logout", get(logout))
}

/// Caller that passed the gate
pub(crate) struct Visitor {
    pub ctx: RequestContext,
    set_cookie: Option<String>,
}

impl Visitor {
    /// Render a page for this visitor, carrying a new session cookie if any
    pub fn page(&self, state: &AppState, title: &str, subtitle: &str, body: &str) -> Response {
        let status = SidebarStatus::SignedIn {
            ctx: &self.ctx,
            support_email: state.auth.support_email(),
        };
        let html = Html(render_page(title, subtitle, &status, body));
        match &self.set_cookie {
            Some(cookie) => ([(header::SET_COOKIE, cookie.clone())], html).into_response(),
            None => html.into_response(),
        }
    }
}

pub(crate) enum Admission {
    Admitted(Visitor),
    /// Response to send instead of the page
    Halted(Response),
}

/// Authenticate the request, halting at the login prompt when needed
pub(crate) async fn admit(
    state: &AppState,
    headers: &HeaderMap,
    code: Option<&str>,
) -> PageResult<Admission> {
    match state.auth.authenticate(headers, code).await? {
        AuthOutcome::Authenticated { ctx, set_cookie } => {
            Ok(Admission::Admitted(Visitor { ctx, set_cookie }))
        }
        AuthOutcome::LoginRequired { authorization_url } => Ok(Admission::Halted(
            (
                StatusCode::UNAUTHORIZED,
                Html(render_login_prompt(&authorization_url)),
            )
                .into_response(),
        )),
    }
}

/// Authenticate and count one use, halting when over quota
pub(crate) async fn admit_billable(state: &AppState, headers: &HeaderMap) -> PageResult<Admission> {
    let mut visitor = match admit(state, headers, None).await? {
        Admission::Admitted(visitor) => visitor,
        halted => return Ok(halted),
    };

    let status = state.auth.increase_usage(&mut visitor.ctx).await?;
    if !status.is_allowed() {
        let html = render_quota_exceeded(&visitor.ctx, state.auth.support_email());
        return Ok(Admission::Halted(
            (StatusCode::TOO_MANY_REQUESTS, Html(html)).into_response(),
        ));
    }
    Ok(Admission::Admitted(visitor))
}

/// Non-empty query parameter
pub(crate) fn chosen(param: &Option<String>) -> Option<&str> {
    param.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Guest dropdown choices, first appearance of each name
pub(crate) fn guest_choices(guests: &[Tag]) -> Vec<Choice> {
    let mut seen = BTreeSet::new();
    guests
        .iter()
        .filter(|g| seen.insert(g.name.clone()))
        .map(|g| (g.name.clone(), g.name.clone()))
        .collect()
}

/// The requested choice, or the first one when nothing was requested
///
/// A requested value that is not among the choices is rejected.
pub(crate) fn pick<'a>(
    choices: &'a [Choice],
    requested: Option<&str>,
    what: &str,
) -> PageResult<Option<&'a str>> {
    match requested {
        Some(value) => choices
            .iter()
            .find(|(v, _)| v == value)
            .map(|(v, _)| Some(v.as_str()))
            .ok_or_else(|| PageError::NotFound(format!("{} {}", what, value))),
        None => Ok(choices.first().map(|(v, _)| v.as_str())),
    }
}

/// Selected guest's episode with its transcript tags
pub(crate) struct Episode {
    pub guest: String,
    pub file_id: String,
    pub media_url: String,
    pub tags: Vec<Tag>,
}

/// Add the guest dropdown to `fields` and load the selected guest's episode
///
/// None when no guest is available to select.
pub(crate) async fn select_episode(
    state: &AppState,
    requested: Option<&str>,
    fields: &mut Vec<String>,
) -> PageResult<Option<Episode>> {
    let guests = state.data.guests().await?;
    let options = guest_choices(&guests);
    let selected = pick(&options, requested, "guest")?;
    fields.push(widgets::select("guest", "Guest", &options, selected));

    let Some(name) = selected else {
        return Ok(None);
    };
    let guest = state.data.guest(name).await?;
    let media_url = state.data.media_url(&guest.file_id).await?;
    let tags = state.data.document_tags(&guest.file_id).await?;

    Ok(Some(Episode {
        guest: guest.name,
        file_id: guest.file_id,
        media_url,
        tags,
    }))
}

/// GET /logout
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if state.auth.logout(&headers).await {
        info!("User signed out");
    }
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> Vec<Choice> {
        vec![
            ("mars".to_string(), "Mars".to_string()),
            ("tesla".to_string(), "Tesla".to_string()),
        ]
    }

    #[test]
    fn test_pick_defaults_to_first() {
        assert_eq!(pick(&choices(), None, "topic").unwrap(), Some("mars"));
        assert_eq!(pick(&[], None, "topic").unwrap(), None);
    }

    #[test]
    fn test_pick_rejects_unknown() {
        assert_eq!(pick(&choices(), Some("tesla"), "topic").unwrap(), Some("tesla"));
        assert!(matches!(
            pick(&choices(), Some("venus"), "topic"),
            Err(PageError::NotFound(_))
        ));
    }

    #[test]
    fn test_chosen_ignores_blank() {
        assert_eq!(chosen(&Some("  ".to_string())), None);
        assert_eq!(chosen(&Some(" mars ".to_string())), Some("mars"));
        assert_eq!(chosen(&None), None);
    }
}
