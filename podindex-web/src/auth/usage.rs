//! Per-user usage counters kept in a shared spreadsheet
//!
//! Row 1 holds column labels (`e-mail`, then one column per application).
//! Every other row belongs to one user, keyed by the email in column A.
//! Counters are read, incremented and written back without any locking, so
//! two concurrent requests for the same user can lose an increment.

use async_trait::async_trait;
use podindex_common::config::UsageConfig;
use podindex_common::{Error, Result};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Spreadsheet cell value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UsageValue {
    Int(i64),
    Text(String),
}

impl UsageValue {
    /// All-digit cells become integers; anything else stays text
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = raw.parse() {
                return UsageValue::Int(n);
            }
        }
        UsageValue::Text(raw.to_string())
    }
}

/// One user's row
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    /// 1-based sheet row number
    pub row: u32,
    pub email: String,
    pub labels: Vec<String>,
    /// One value per label
    pub values: Vec<UsageValue>,
}

impl UsageRecord {
    /// Pair a raw row with the labels; cells missing at the end read as empty
    pub fn from_row(row: u32, email: &str, labels: Vec<String>, raw: &[String]) -> Self {
        let values = (0..labels.len())
            .map(|i| {
                raw.get(i)
                    .map(|cell| UsageValue::parse(cell))
                    .unwrap_or_else(|| UsageValue::Text(String::new()))
            })
            .collect();

        Self {
            row,
            email: email.to_string(),
            labels,
            values,
        }
    }

    fn column(&self, app_id: &str) -> Result<usize> {
        self.labels
            .iter()
            .position(|l| l == app_id)
            .ok_or_else(|| Error::Config(format!("Usage sheet has no column {}", app_id)))
    }

    /// Current counter for the application; an empty cell counts as 0
    pub fn counter(&self, app_id: &str) -> Result<i64> {
        match &self.values[self.column(app_id)?] {
            UsageValue::Int(n) => Ok(*n),
            UsageValue::Text(s) if s.is_empty() => Ok(0),
            UsageValue::Text(s) => Err(Error::Parse(format!(
                "usage counter {} for {} is not a number: {}",
                app_id, self.email, s
            ))),
        }
    }

    fn increment(&mut self, app_id: &str) -> Result<i64> {
        let next = self.counter(app_id)?.checked_add(1).ok_or_else(|| {
            Error::Parse(format!(
                "usage counter {} for {} is out of range",
                app_id, self.email
            ))
        })?;
        let column = self.column(app_id)?;
        self.values[column] = UsageValue::Int(next);
        Ok(next)
    }
}

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaStatus {
    Allowed { used: i64, limit: i64 },
    Exceeded { used: i64, limit: i64 },
}

impl QuotaStatus {
    pub fn evaluate(used: i64, limit: i64) -> Self {
        if used > limit {
            QuotaStatus::Exceeded { used, limit }
        } else {
            QuotaStatus::Allowed { used, limit }
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaStatus::Allowed { .. })
    }
}

/// Row-level access to the usage spreadsheet
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Row 1
    async fn labels(&self) -> Result<Vec<String>>;

    /// Row number of the user, matching column A case-insensitively
    async fn find_row(&self, email: &str) -> Result<Option<u32>>;

    async fn row_values(&self, row: u32) -> Result<Vec<String>>;

    async fn append_row(&self, values: &[UsageValue]) -> Result<()>;

    /// Overwrite `A{row}:{row}`
    async fn update_row(&self, row: u32, values: &[UsageValue]) -> Result<()>;
}

/// Usage lookup, provisioning and quota accounting for one application
pub struct UsageMeter {
    store: Arc<dyn UsageStore>,
    app_id: String,
    usage_limit: i64,
    retry_max_delay: Duration,
}

impl UsageMeter {
    pub fn new(store: Arc<dyn UsageStore>, config: &UsageConfig) -> Self {
        Self {
            store,
            app_id: config.app_id.clone(),
            usage_limit: config.usage_limit,
            retry_max_delay: Duration::from_secs(config.lookup_retry_max_delay_secs),
        }
    }

    pub fn usage_limit(&self) -> i64 {
        self.usage_limit
    }

    fn retry_delay(&self) -> Duration {
        let max_ms = self.retry_max_delay.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Find the user's row, provisioning one on a confirmed miss
    ///
    /// A miss is retried once after a random delay, since another request
    /// may be appending the same user's row at that moment.
    pub async fn lookup(&self, email: &str) -> Result<UsageRecord> {
        let labels = self.store.labels().await?;

        let mut row = self.store.find_row(email).await?;
        if row.is_none() {
            let delay = self.retry_delay();
            debug!(email = %email, delay_ms = delay.as_millis() as u64, "Usage row missing, retrying");
            tokio::time::sleep(delay).await;
            row = self.store.find_row(email).await?;
        }

        if let Some(row) = row {
            let raw = self.store.row_values(row).await?;
            return Ok(UsageRecord::from_row(row, email, labels, &raw));
        }

        let mut values = vec![UsageValue::Text(email.to_string())];
        values.extend((1..labels.len()).map(|_| UsageValue::Int(0)));
        self.store.append_row(&values).await?;

        let row = self.store.find_row(email).await?.ok_or_else(|| {
            Error::Internal(format!("usage row for {} missing after append", email))
        })?;
        info!(email = %email, row, "Provisioned usage row");

        Ok(UsageRecord {
            row,
            email: email.to_string(),
            labels,
            values,
        })
    }

    /// Quota status without touching the counter
    pub fn check(&self, record: &UsageRecord) -> Result<QuotaStatus> {
        Ok(QuotaStatus::evaluate(
            record.counter(&self.app_id)?,
            self.usage_limit,
        ))
    }

    /// Increment, write the row back, then evaluate the quota
    pub async fn increase(&self, record: &mut UsageRecord) -> Result<QuotaStatus> {
        let used = record.increment(&self.app_id)?;
        self.store.update_row(record.row, &record.values).await?;

        let status = QuotaStatus::evaluate(used, self.usage_limit);
        if !status.is_allowed() {
            warn!(email = %record.email, used, limit = self.usage_limit, "Usage quota exceeded");
        }
        Ok(status)
    }
}
