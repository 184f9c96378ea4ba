//! Bearer credentials for the usage spreadsheet
//!
//! A service-account key mints short-lived tokens on demand; `gcp_auth`
//! caches each token and refreshes it shortly before expiry. A static
//! token from config, when present, takes precedence.

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use podindex_common::config::UsageConfig;
use podindex_common::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// OAuth scope granting read/write access to spreadsheets
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Source of the bearer token sent with every sheet request
#[async_trait]
pub trait SheetsCredentials: Send + Sync {
    async fn bearer_token(&self) -> Result<String>;
}

/// Fixed, pre-minted token
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl SheetsCredentials for StaticToken {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Tokens minted from a Google service-account key
pub struct ServiceAccountToken {
    account: CustomServiceAccount,
}

impl ServiceAccountToken {
    pub fn from_file(path: &Path) -> Result<Self> {
        let account = CustomServiceAccount::from_file(path).map_err(|e| {
            Error::Config(format!(
                "Invalid service account key {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self { account })
    }

    pub fn from_json(key: &str) -> Result<Self> {
        let account = CustomServiceAccount::from_json(key)
            .map_err(|e| Error::Config(format!("Invalid service account key: {}", e)))?;
        Ok(Self { account })
    }
}

#[async_trait]
impl SheetsCredentials for ServiceAccountToken {
    async fn bearer_token(&self) -> Result<String> {
        let token = self
            .account
            .token(&[SHEETS_SCOPE])
            .await
            .map_err(|e| Error::Network(format!("service account token: {}", e)))?;
        debug!("Sheet access token ready");
        Ok(token.as_str().to_string())
    }
}

/// Pick the credential source configured for the usage sheet
pub fn credentials_from_config(config: &UsageConfig) -> Result<Arc<dyn SheetsCredentials>> {
    if !config.access_token.trim().is_empty() {
        info!("Usage sheet uses a static access token");
        return Ok(Arc::new(StaticToken::new(config.access_token.trim())));
    }

    let key_path = config.service_account_json.trim();
    if key_path.is_empty() {
        return Err(Error::Config(
            "No usage sheet credentials: set usage.service_account_json or usage.access_token"
                .to_string(),
        ));
    }

    info!(key = %key_path, "Usage sheet uses a service account");
    Ok(Arc::new(ServiceAccountToken::from_file(Path::new(key_path))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_static_token_overrides_service_account() {
        let config = UsageConfig {
            access_token: " ya29.static ".to_string(),
            service_account_json: "/does/not/exist.json".to_string(),
            ..UsageConfig::default()
        };
        let credentials = credentials_from_config(&config).unwrap();
        assert_eq!(credentials.bearer_token().await.unwrap(), "ya29.static");
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let result = credentials_from_config(&UsageConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unreadable_key_file_is_config_error() {
        let config = UsageConfig {
            service_account_json: "/does/not/exist.json".to_string(),
            ..UsageConfig::default()
        };
        assert!(matches!(
            credentials_from_config(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_malformed_key_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"type": "service_account", "client_email": "x"}"#)
            .unwrap();

        assert!(matches!(
            ServiceAccountToken::from_file(file.path()),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ServiceAccountToken::from_json("not json"),
            Err(Error::Config(_))
        ));
    }
}
