//! Outbound HTTP helpers shared by the remote service clients

use podindex_common::{Error, Result};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("podindex/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with the configured request timeout
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Network(e.to_string()))
}

/// Parse a base URL, making sure relative joins append to its path
pub fn parse_base_url(base: &str) -> Result<Url> {
    let normalized = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    Url::parse(&normalized).map_err(|e| Error::Config(format!("Invalid URL {}: {}", base, e)))
}

pub fn network_error(e: reqwest::Error) -> Error {
    Error::Network(e.to_string())
}

/// Decode a JSON body, turning non-success statuses into errors
pub async fn decode_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(Error::NotFound(what.to_string()));
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| Error::Parse(format!("{}: {}", what, e)))
}

/// Fail on non-success statuses, ignoring the body otherwise
pub async fn ensure_success(response: Response, what: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(Error::NotFound(what.to_string()));
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
