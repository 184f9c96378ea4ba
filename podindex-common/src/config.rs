//! Configuration loading and config file resolution
//!
//! Settings come from (highest priority first):
//! 1. Environment variables for secrets (`PODINDEX_*`)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing config file is not fatal: the service logs a warning and starts
//! with defaults, then [`AppConfig::validate`] reports what is still missing.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "PODINDEX_CONFIG";

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Timeout applied to every outbound HTTP request
    pub http_timeout_secs: u64,
    pub server: ServerConfig,
    pub steamship: SteamshipConfig,
    pub oauth: OAuthConfig,
    pub usage: UsageConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Tag store connection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SteamshipConfig {
    pub api_key: String,
    /// Base URL ending in `/`, e.g. `https://api.steamship.com/api/v1/`
    pub api_base: String,
    pub workspace: String,
}

/// Google OAuth2 client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub people_url: String,
}

/// Spreadsheet-backed usage quota
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    pub sheets_api_base: String,
    pub sheet_id: String,
    pub worksheet_name: String,
    /// Path to a Google service-account JSON key used to mint sheet tokens
    pub service_account_json: String,
    /// Pre-minted bearer token; when set it overrides the service account
    pub access_token: String,
    /// Column label holding this application's counter
    pub app_id: String,
    pub usage_limit: i64,
    pub support_email: String,
    /// Upper bound of the randomized delay before re-looking up a missing row
    pub lookup_retry_max_delay_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_fetch_workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            server: ServerConfig::default(),
            steamship: SteamshipConfig::default(),
            oauth: OAuthConfig::default(),
            usage: UsageConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
        }
    }
}

impl Default for SteamshipConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.steamship.com/api/v1/".to_string(),
            workspace: "podcasts".to_string(),
        }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://127.0.0.1:5780/".to_string(),
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            people_url: "https://people.googleapis.com/v1/people/me".to_string(),
        }
    }
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            sheets_api_base: "https://sheets.googleapis.com/v4/".to_string(),
            sheet_id: String::new(),
            worksheet_name: "usage".to_string(),
            service_account_json: String::new(),
            access_token: String::new(),
            app_id: "podcast-index".to_string(),
            usage_limit: 10,
            support_email: "developers@steamship.com".to_string(),
            lookup_retry_max_delay_secs: 10,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_fetch_workers: 16,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply env overrides
    ///
    /// A path that does not exist is logged and skipped. A file that exists but
    /// fails to parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                let config = Self::from_toml_str(&content)?;
                info!("Loaded configuration from {}", path.display());
                config
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                Self::default()
            }
            None => {
                warn!("No config file found, using compiled defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Override secrets from the environment
    pub fn apply_env_overrides(&mut self) {
        override_from_env(&mut self.steamship.api_key, "PODINDEX_STEAMSHIP_API_KEY");
        override_from_env(&mut self.oauth.client_id, "PODINDEX_OAUTH_CLIENT_ID");
        override_from_env(&mut self.oauth.client_secret, "PODINDEX_OAUTH_CLIENT_SECRET");
        override_from_env(&mut self.usage.access_token, "PODINDEX_SHEETS_TOKEN");
        override_from_env(
            &mut self.usage.service_account_json,
            "PODINDEX_SHEETS_SERVICE_ACCOUNT",
        );
        override_from_env(&mut self.usage.sheet_id, "PODINDEX_USAGE_SHEET_ID");
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("steamship.api_key", &self.steamship.api_key),
            ("steamship.api_base", &self.steamship.api_base),
            ("oauth.client_id", &self.oauth.client_id),
            ("oauth.client_secret", &self.oauth.client_secret),
            ("oauth.redirect_uri", &self.oauth.redirect_uri),
            ("usage.sheet_id", &self.usage.sheet_id),
            ("usage.worksheet_name", &self.usage.worksheet_name),
            ("usage.app_id", &self.usage.app_id),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.usage.access_token.trim().is_empty()
            && self.usage.service_account_json.trim().is_empty()
        {
            return Err(Error::Config(
                "Missing usage credentials: set usage.service_account_json or usage.access_token"
                    .to_string(),
            ));
        }

        if self.cache.max_fetch_workers == 0 {
            return Err(Error::Config(
                "cache.max_fetch_workers must be at least 1".to_string(),
            ));
        }

        if self.usage.usage_limit < 0 {
            return Err(Error::Config("usage.usage_limit must not be negative".to_string()));
        }

        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn override_from_env(field: &mut String, env_var_name: &str) {
    if let Ok(value) = std::env::var(env_var_name) {
        if !value.trim().is_empty() {
            *field = value;
        }
    }
}

/// Config file resolution, in priority order:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. `<config dir>/podindex/config.toml` if it exists
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("podindex").join("config.toml"))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.usage.lookup_retry_max_delay_secs, 10);
        assert_eq!(config.bind_address(), "127.0.0.1:5780");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            http_timeout_secs = 5

            [usage]
            usage_limit = 3
            app_id = "tldr"
            "#,
        )
        .unwrap();

        assert_eq!(config.http_timeout_secs, 5);
        assert_eq!(config.usage.usage_limit, 3);
        assert_eq!(config.usage.app_id, "tldr");
        assert_eq!(config.usage.worksheet_name, "usage");
        assert_eq!(config.server.port, 5780);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("server = 12").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_lists_missing_keys() {
        let err = AppConfig::default().validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("steamship.api_key"));
        assert!(!message.contains("usage.access_token"));
    }

    #[test]
    fn test_validate_needs_one_sheet_credential() {
        let mut config = AppConfig::default();
        config.steamship.api_key = "key".into();
        config.oauth.client_id = "id".into();
        config.oauth.client_secret = "secret".into();
        config.usage.sheet_id = "sheet".into();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("usage.service_account_json"));

        config.usage.service_account_json = "/etc/podindex/sa.json".into();
        assert!(config.validate().is_ok());

        config.usage.service_account_json.clear();
        config.usage.access_token = "ya29.token".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = AppConfig::default();
        config.steamship.api_key = "key".into();
        config.oauth.client_id = "id".into();
        config.oauth.client_secret = "secret".into();
        config.usage.sheet_id = "sheet".into();
        config.usage.access_token = "token".into();
        assert!(config.validate().is_ok());

        config.cache.max_fetch_workers = 0;
        assert!(config.validate().is_err());
    }
}
