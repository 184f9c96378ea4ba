//! Login and usage gate in front of every page
//!
//! A request is authenticated either by its session cookie or by an OAuth
//! `?code=` coming back from the identity provider. Anything else (no code,
//! a failed exchange, an expired token) ends at the login prompt.

pub mod credentials;
pub mod oauth;
pub mod session;
pub mod sheets;
pub mod usage;

use axum::http::HeaderMap;
use podindex_common::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub use credentials::{
    credentials_from_config, ServiceAccountToken, SheetsCredentials, StaticToken, SHEETS_SCOPE,
};
pub use oauth::{AccessToken, GoogleOAuth, IdentityProvider};
pub use session::{
    clear_session_cookie, session_cookie, session_id_from_headers, RequestContext, SessionStore,
};
pub use sheets::SheetsUsageStore;
pub use usage::{QuotaStatus, UsageMeter, UsageRecord, UsageStore, UsageValue};

/// Result of authenticating one request
#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated {
        ctx: RequestContext,
        /// Set when this request created the session
        set_cookie: Option<String>,
    },
    LoginRequired {
        authorization_url: String,
    },
}

pub struct AuthGate {
    identity: Arc<dyn IdentityProvider>,
    meter: UsageMeter,
    sessions: SessionStore,
    support_email: String,
}

impl AuthGate {
    pub fn new(identity: Arc<dyn IdentityProvider>, meter: UsageMeter, support_email: &str) -> Self {
        Self {
            identity,
            meter,
            sessions: SessionStore::new(),
            support_email: support_email.to_string(),
        }
    }

    pub fn authorization_url(&self) -> String {
        self.identity.authorization_url()
    }

    pub fn support_email(&self) -> &str {
        &self.support_email
    }

    pub fn usage_limit(&self) -> i64 {
        self.meter.usage_limit()
    }

    /// Resolve the caller from the session cookie or an OAuth code
    ///
    /// Usage is re-read from the sheet on every request so that counters
    /// edited by hand take effect immediately.
    pub async fn authenticate(&self, headers: &HeaderMap, code: Option<&str>) -> Result<AuthOutcome> {
        if let Some(session_id) = session_id_from_headers(headers) {
            if let Some(session) = self.sessions.get(&session_id).await {
                let usage = self.meter.lookup(&session.email).await?;
                self.sessions.update_usage(&session_id, usage.clone()).await;
                let quota = self.meter.check(&usage)?;
                return Ok(AuthOutcome::Authenticated {
                    ctx: RequestContext {
                        session_id,
                        email: session.email,
                        usage,
                        quota,
                    },
                    set_cookie: None,
                });
            }
        }

        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return Ok(self.login_required());
        };

        let token = match self.identity.exchange_code(code).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Authorization code exchange failed");
                return Ok(self.login_required());
            }
        };
        if token.is_expired() {
            warn!("Access token already expired");
            return Ok(self.login_required());
        }

        let email = self.identity.resolve_email(&token).await?;
        let usage = self.meter.lookup(&email).await?;
        let quota = self.meter.check(&usage)?;
        let session_id = self.sessions.create(&email, usage.clone()).await;
        info!(email = %email, "User signed in");

        Ok(AuthOutcome::Authenticated {
            ctx: RequestContext {
                session_id,
                email,
                usage,
                quota,
            },
            set_cookie: Some(session_cookie(&session_id)),
        })
    }

    fn login_required(&self) -> AuthOutcome {
        AuthOutcome::LoginRequired {
            authorization_url: self.authorization_url(),
        }
    }

    /// Count one billable action against the caller's quota
    pub async fn increase_usage(&self, ctx: &mut RequestContext) -> Result<QuotaStatus> {
        let status = self.meter.increase(&mut ctx.usage).await?;
        self.sessions
            .update_usage(&ctx.session_id, ctx.usage.clone())
            .await;
        ctx.quota = status;
        Ok(status)
    }

    /// Drop the caller's session; true if there was one
    pub async fn logout(&self, headers: &HeaderMap) -> bool {
        match session_id_from_headers(headers) {
            Some(id) => self.sessions.remove(&id).await,
            None => false,
        }
    }
}
