//! podindex-web library - podcast transcript dashboard
//!
//! Browse podcast transcripts by topic, guest, sentiment and summary. Tags
//! come from a hosted tag store; users sign in with Google and every
//! billable page view is counted in a shared usage spreadsheet.

use axum::Router;
use chrono::{DateTime, Utc};
use podindex_common::cache::SystemClock;
use podindex_common::config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub mod aggregate;
pub mod api;
pub mod auth;
pub mod data;
pub mod error;
pub mod http;
pub mod steamship;

use auth::{AuthGate, GoogleOAuth, SheetsUsageStore, UsageMeter};
use data::DataAccess;
use steamship::SteamshipClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Cached tag store lookups
    pub data: Arc<DataAccess>,
    /// Login, sessions and usage quota
    pub auth: Arc<AuthGate>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(data: Arc<DataAccess>, auth: Arc<AuthGate>) -> Self {
        Self {
            data,
            auth,
            startup_time: Utc::now(),
        }
    }

    /// Wire the real remote clients from configuration
    pub fn from_config(config: &AppConfig) -> podindex_common::Result<Self> {
        let timeout = Duration::from_secs(config.http_timeout_secs);

        let store = Arc::new(SteamshipClient::new(&config.steamship, timeout)?);
        let data = DataAccess::new(
            store,
            Duration::from_secs(config.cache.ttl_secs),
            Arc::new(SystemClock),
            config.cache.max_fetch_workers,
        );

        let identity = Arc::new(GoogleOAuth::new(&config.oauth, timeout)?);
        let sheet = Arc::new(SheetsUsageStore::new(&config.usage, timeout)?);
        let meter = UsageMeter::new(sheet, &config.usage);
        let auth = AuthGate::new(identity, meter, &config.usage.support_email);

        Ok(Self::new(Arc::new(data), Arc::new(auth)))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
