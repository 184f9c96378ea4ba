//! Test Helper Utilities
//!
//! Shared fakes and fixtures for testing podindex-web

#![allow(dead_code, unused_imports)]

pub mod fakes;
pub mod fixtures;

pub use fakes::{
    FakeIdentity, FakeTagStore, MemoryUsageStore, EXPIRED_CODE, GOOD_CODE, USER_EMAIL,
};
pub use fixtures::{episode_document, topic_entity_tags, EPISODE_ID, GUEST, MEDIA_URL};

use axum::Router;
use podindex_common::cache::ManualClock;
use podindex_common::config::UsageConfig;
use podindex_web::auth::{AuthGate, UsageMeter};
use podindex_web::data::DataAccess;
use podindex_web::{build_router, AppState};
use std::sync::Arc;
use std::time::Duration;

pub const SUPPORT_EMAIL: &str = "support@example.com";
pub const APP_ID: &str = "podcast-index";

/// App wired to in-memory fakes
pub struct TestApp {
    pub router: Router,
    pub store: Arc<FakeTagStore>,
    pub sheet: Arc<MemoryUsageStore>,
}

/// Build a router over the fixture episode with the given usage sheet rows
pub fn test_app(sheet_rows: Vec<Vec<&str>>, usage_limit: i64) -> TestApp {
    let store = Arc::new(FakeTagStore::with_fixture());
    let sheet = Arc::new(MemoryUsageStore::new(sheet_rows));

    let data = DataAccess::new(
        store.clone(),
        Duration::from_secs(3600),
        Arc::new(ManualClock::new()),
        4,
    );

    let usage = UsageConfig {
        app_id: APP_ID.to_string(),
        usage_limit,
        lookup_retry_max_delay_secs: 0,
        support_email: SUPPORT_EMAIL.to_string(),
        ..UsageConfig::default()
    };
    let meter = UsageMeter::new(sheet.clone(), &usage);
    let auth = AuthGate::new(Arc::new(FakeIdentity::default()), meter, SUPPORT_EMAIL);

    let state = AppState::new(Arc::new(data), Arc::new(auth));
    TestApp {
        router: build_router(state),
        store,
        sheet,
    }
}

/// Usage sheet with a label row and no users
pub fn empty_sheet() -> Vec<Vec<&'static str>> {
    vec![vec!["e-mail", APP_ID]]
}

/// Serve a router on an ephemeral local port, returning its base URL
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", address)
}
