//! Google Sheets values API backend for the usage store

use async_trait::async_trait;
use podindex_common::config::UsageConfig;
use podindex_common::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::credentials::{credentials_from_config, SheetsCredentials};
use super::usage::{UsageStore, UsageValue};
use crate::http::{build_client, decode_json, ensure_success, network_error, parse_base_url};

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RowUpdate<'a> {
    major_dimension: &'static str,
    values: [&'a [UsageValue]; 1],
}

/// Cells come back formatted as strings, but numbers are accepted too
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Usage store backed by one worksheet of a spreadsheet
pub struct SheetsUsageStore {
    http_client: reqwest::Client,
    api_base: Url,
    sheet_id: String,
    worksheet: String,
    credentials: Arc<dyn SheetsCredentials>,
}

impl SheetsUsageStore {
    /// Store authenticated with the credentials named in `config`
    pub fn new(config: &UsageConfig, timeout: Duration) -> Result<Self> {
        Self::with_credentials(config, timeout, credentials_from_config(config)?)
    }

    pub fn with_credentials(
        config: &UsageConfig,
        timeout: Duration,
        credentials: Arc<dyn SheetsCredentials>,
    ) -> Result<Self> {
        Ok(Self {
            http_client: build_client(timeout)?,
            api_base: parse_base_url(&config.sheets_api_base)?,
            sheet_id: config.sheet_id.clone(),
            worksheet: config.worksheet_name.clone(),
            credentials,
        })
    }

    /// `{base}spreadsheets/{id}/values/{worksheet}!{range}{suffix}`
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        let segment = format!("{}!{}{}", self.worksheet, range, suffix);
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid sheets API base {}", self.api_base)))?
            .pop_if_empty()
            .extend(["spreadsheets", self.sheet_id.as_str(), "values", segment.as_str()]);
        Ok(url)
    }

    async fn get_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let token = self.credentials.bearer_token().await?;
        let response = self
            .http_client
            .get(self.values_url(range, "")?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(network_error)?;

        let body: ValueRange = decode_json(response, &format!("sheet range {}", range)).await?;
        Ok(body
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }
}

#[async_trait]
impl UsageStore for SheetsUsageStore {
    async fn labels(&self) -> Result<Vec<String>> {
        let rows = self.get_range("1:1").await?;
        let labels = rows.into_iter().next().unwrap_or_default();
        if labels.is_empty() {
            return Err(Error::Config(format!(
                "Worksheet {} has no label row",
                self.worksheet
            )));
        }
        Ok(labels)
    }

    async fn find_row(&self, email: &str) -> Result<Option<u32>> {
        let column = self.get_range("A:A").await?;
        let found = column
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| {
                row.first()
                    .map_or(false, |cell| cell.to_lowercase() == email.to_lowercase())
            })
            .map(|(index, _)| index as u32 + 1);

        debug!(email = %email, row = ?found, "Usage row lookup");
        Ok(found)
    }

    async fn row_values(&self, row: u32) -> Result<Vec<String>> {
        let rows = self.get_range(&format!("{}:{}", row, row)).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn append_row(&self, values: &[UsageValue]) -> Result<()> {
        let token = self.credentials.bearer_token().await?;
        let response = self
            .http_client
            .post(self.values_url("A1", ":append")?)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(token)
            .json(&RowUpdate {
                major_dimension: "ROWS",
                values: [values],
            })
            .send()
            .await
            .map_err(network_error)?;

        ensure_success(response, "sheet append").await
    }

    async fn update_row(&self, row: u32, values: &[UsageValue]) -> Result<()> {
        let token = self.credentials.bearer_token().await?;
        let response = self
            .http_client
            .put(self.values_url(&format!("A{}:{}", row, row), "")?)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&RowUpdate {
                major_dimension: "ROWS",
                values: [values],
            })
            .send()
            .await
            .map_err(network_error)?;

        ensure_success(response, "sheet update").await
    }
}
