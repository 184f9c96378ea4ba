//! Steamship tag store client
//!
//! Tag queries go to `POST {api_base}tag/query` and document fetches to
//! `POST {api_base}file/get`. Every response is wrapped in `{"data": ...}`.

use async_trait::async_trait;
use podindex_common::config::SteamshipConfig;
use podindex_common::{Document, Error, Result, Tag, TagFilter};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::TagStore;
use crate::http::{build_client, decode_json, network_error, parse_base_url};

const WORKSPACE_HEADER: &str = "X-Workspace-Handle";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskStatus {
    #[serde(default)]
    status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagQueryData {
    #[serde(default)]
    tags: Vec<Tag>,
}

impl<T> Envelope<T> {
    fn into_data(self, what: &str) -> Result<T> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(Error::Parse(format!(
                "{}: response had no data ({})",
                what,
                self.status
                    .and_then(|s| s.status_message)
                    .unwrap_or_else(|| "no status message".to_string())
            ))),
        }
    }
}

/// HTTP client for the hosted tag store
pub struct SteamshipClient {
    http_client: reqwest::Client,
    api_base: Url,
    api_key: String,
    workspace: String,
}

impl SteamshipClient {
    pub fn new(config: &SteamshipConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_client(timeout)?,
            api_base: parse_base_url(&config.api_base)?,
            api_key: config.api_key.clone(),
            workspace: config.workspace.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|e| Error::Internal(format!("Bad endpoint {}: {}", path, e)))
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
        what: &str,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.api_key)
            .header(WORKSPACE_HEADER, &self.workspace)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let envelope: Envelope<T> = decode_json(response, what).await?;
        envelope.into_data(what)
    }
}

#[async_trait]
impl TagStore for SteamshipClient {
    async fn query_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>> {
        let expression = filter.to_string();
        debug!(filter = %expression, "Querying tag store");

        let data: TagQueryData = self
            .post("tag/query", json!({ "tagFilterQuery": expression }), "tag query")
            .await?;

        info!(filter = %expression, tags = data.tags.len(), "Tag query returned");
        Ok(data.tags)
    }

    async fn get_document(&self, id: &str) -> Result<Document> {
        debug!(file_id = %id, "Fetching document");
        let document: Document = self
            .post("file/get", json!({ "id": id }), &format!("document {}", id))
            .await?;

        debug!(
            file_id = %id,
            blocks = document.blocks.len(),
            file_tags = document.tags.len(),
            "Fetched document"
        );
        Ok(document)
    }
}
