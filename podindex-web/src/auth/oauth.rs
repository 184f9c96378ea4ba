//! Google OAuth2 authorization-code login
//!
//! The browser is sent to the authorization URL, comes back with `?code=`,
//! and the code is exchanged for an access token. The token is only used
//! once, to look up the signed-in user's primary email address.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use podindex_common::config::OAuthConfig;
use podindex_common::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::http::{build_client, decode_json, network_error};

const SCOPES: &str = "email profile";

/// Access token returned by the token endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub access_token: String,
    /// None when the provider did not report a lifetime
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires_at| expires_at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Identity provider seam for the login flow
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to sign in
    fn authorization_url(&self) -> String;

    /// Exchange an authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<AccessToken>;

    /// Primary email address of the token's owner
    async fn resolve_email(&self, token: &AccessToken) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonResponse {
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    value: String,
    #[serde(default)]
    metadata: EmailMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct EmailMetadata {
    #[serde(default)]
    primary: bool,
}

/// Pick the primary address, falling back to the first one listed
fn primary_email(person: PersonResponse) -> Option<String> {
    let mut addresses = person.email_addresses;
    let index = addresses
        .iter()
        .position(|a| a.metadata.primary)
        .unwrap_or(0);
    if index < addresses.len() {
        Some(addresses.swap_remove(index).value)
    } else {
        None
    }
}

/// Google OAuth2 client
pub struct GoogleOAuth {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_url: Url,
    token_url: Url,
    people_url: Url,
}

impl GoogleOAuth {
    pub fn new(config: &OAuthConfig, timeout: Duration) -> Result<Self> {
        let parse = |name: &str, value: &str| {
            Url::parse(value).map_err(|e| Error::Config(format!("Invalid oauth.{}: {}", name, e)))
        };

        Ok(Self {
            http_client: build_client(timeout)?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            authorize_url: parse("authorize_url", &config.authorize_url)?,
            token_url: parse("token_url", &config.token_url)?,
            people_url: parse("people_url", &config.people_url)?,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    fn authorization_url(&self) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES);
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(network_error)?;

        let token: TokenResponse = decode_json(response, "oauth token").await?;
        debug!(expires_in = ?token.expires_in, "Exchanged authorization code");

        Ok(AccessToken {
            access_token: token.access_token,
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + ChronoDuration::seconds(secs)),
        })
    }

    async fn resolve_email(&self, token: &AccessToken) -> Result<String> {
        let response = self
            .http_client
            .get(self.people_url.clone())
            .query(&[("personFields", "emailAddresses")])
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(network_error)?;

        let person: PersonResponse = decode_json(response, "profile").await?;
        let email = primary_email(person)
            .ok_or_else(|| Error::NotFound("email address on profile".to_string()))?;

        info!(email = %email, "Resolved signed-in user");
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:5780/".to_string(),
            ..OAuthConfig::default()
        }
    }

    #[test]
    fn test_authorization_url_carries_client_and_scopes() {
        let oauth = GoogleOAuth::new(&config(), Duration::from_secs(5)).unwrap();
        let url = Url::parse(&oauth.authorization_url()).unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(url.as_str().starts_with("https://accounts.google.com/"));
        assert!(pairs.contains(&("client_id".into(), "client-123".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://localhost:5780/".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("scope".into(), "email profile".into())));
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let token = AccessToken {
            access_token: "t".to_string(),
            expires_at: Some(now - ChronoDuration::seconds(1)),
        };
        assert!(token.is_expired_at(now));

        let fresh = AccessToken {
            expires_at: Some(now + ChronoDuration::seconds(3600)),
            ..token.clone()
        };
        assert!(!fresh.is_expired_at(now));

        let unbounded = AccessToken {
            expires_at: None,
            ..token
        };
        assert!(!unbounded.is_expired_at(now));
    }

    #[test]
    fn test_primary_email_preferred() {
        let person: PersonResponse = serde_json::from_value(json!({
            "emailAddresses": [
                {"value": "alt@example.com", "metadata": {"primary": false}},
                {"value": "joe@example.com", "metadata": {"primary": true}}
            ]
        }))
        .unwrap();
        assert_eq!(primary_email(person).as_deref(), Some("joe@example.com"));

        let person: PersonResponse =
            serde_json::from_value(json!({"emailAddresses": [{"value": "only@example.com"}]}))
                .unwrap();
        assert_eq!(primary_email(person).as_deref(), Some("only@example.com"));

        let person: PersonResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(primary_email(person), None);
    }
}
