//! Error types for podindex-web page handlers

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::api::ui::layout::{escape_html, render_message_page};

/// Page handler error
///
/// Any error halts the current render; the user sees an error page instead
/// of partial results.
#[derive(Debug, Error)]
pub enum PageError {
    /// Invalid selection or query parameter (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Selected item does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failure reported by the tag store, identity provider or usage sheet
    #[error(transparent)]
    Common(#[from] podindex_common::Error),
}

impl PageError {
    fn status(&self) -> StatusCode {
        match self {
            PageError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::Common(podindex_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            PageError::Common(e) if e.is_remote() => StatusCode::BAD_GATEWAY,
            PageError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Page render failed");
        }

        let body = render_message_page(
            "Something went wrong",
            &format!("<p class=\"error\">{}</p>", escape_html(&self.to_string())),
        );
        (status, Html(body)).into_response()
    }
}

/// Result type for page handlers
pub type PageResult<T> = Result<T, PageError>;
