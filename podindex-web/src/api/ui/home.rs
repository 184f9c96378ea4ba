//! Home page - introduction and OAuth redirect target

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use super::layout::{render_page, SidebarStatus};
use super::{admit, chosen, Admission};
use crate::error::PageResult;
use crate::AppState;

const INTRO: &str = r#"
<h3>Topics</h3>
<p>Explore what the host and guests have to say about topics of your interest.</p>
<h3>TLDR</h3>
<p>Catch up with an episode by reading its chapter summaries.</p>
<h3>Sentiments, Search and Entities</h3>
<p>See what guests feel good or bad about, find the moment a phrase was said,
or jump to every mention of the people and places you pick.</p>
"#;

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    code: Option<String>,
}

/// GET /
///
/// Handles `?code=` from the identity provider. Signed-out visitors see
/// the introduction with the sign-in prompt.
pub async fn home_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HomeQuery>,
) -> PageResult<Response> {
    match admit(&state, &headers, chosen(&query.code)).await? {
        Admission::Admitted(visitor) => {
            let body = format!(
                "{}<h3>Getting started</h3><p>Click one of the links in the sidebar to get started.</p>",
                INTRO
            );
            Ok(visitor.page(&state, "The Podcast Index", "", &body))
        }
        Admission::Halted(_) => {
            let authorization_url = state.auth.authorization_url();
            let body = format!("{}<p>Please sign in to use our app.</p>", INTRO);
            Ok(Html(render_page(
                "The Podcast Index",
                "",
                &SidebarStatus::SignInAt(&authorization_url),
                &body,
            ))
            .into_response())
        }
    }
}
