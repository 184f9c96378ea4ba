//! In-memory stand-ins for the remote services

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use podindex_common::{Document, Error, Result, Tag, TagFilter};
use podindex_web::auth::{AccessToken, IdentityProvider, UsageStore, UsageValue};
use podindex_web::data::{
    entity_tags_filter, guests_by_topic_filter, guests_filter, rank_topics, topics_filter,
};
use podindex_web::steamship::TagStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::fixtures::{episode_document, guest_tag, topic_entity_tags, GUEST};

/// Tag store answering canned filter expressions
#[derive(Default)]
pub struct FakeTagStore {
    queries: HashMap<String, Vec<Tag>>,
    documents: HashMap<String, Document>,
    pub fail: AtomicBool,
    pub query_count: AtomicUsize,
    pub document_fetches: AtomicUsize,
}

impl FakeTagStore {
    pub fn with_fixture() -> Self {
        let mut store = Self::default();
        store.answer(&guests_filter(), vec![guest_tag()]);
        store.answer(&topics_filter(), topic_entity_tags());

        let index = rank_topics(&topic_entity_tags());
        for topic in &index.topics {
            store.answer(&guests_by_topic_filter(topic), vec![guest_tag()]);
            let tags = topic_entity_tags()
                .into_iter()
                .filter(|t| t.value_str("value").map(str::to_lowercase).as_deref() == Some(topic.key.as_str()))
                .collect();
            store.answer(&entity_tags_filter(topic, GUEST), tags);
        }

        let document = episode_document();
        store.documents.insert(document.id.clone(), document);
        store
    }

    pub fn answer(&mut self, filter: &TagFilter, tags: Vec<Tag>) {
        self.queries.insert(filter.to_string(), tags);
    }

    fn check_available(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TagStore for FakeTagStore {
    async fn query_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>> {
        self.check_available()?;
        self.query_count.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .queries
            .get(&filter.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_document(&self, id: &str) -> Result<Document> {
        self.check_available()?;
        self.document_fetches.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("document {}", id)))
    }
}

pub const GOOD_CODE: &str = "good-code";
pub const EXPIRED_CODE: &str = "expired-code";
pub const USER_EMAIL: &str = "joe@example.com";

/// Identity provider accepting one fixed code
#[derive(Default)]
pub struct FakeIdentity;

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn authorization_url(&self) -> String {
        "https://accounts.example.com/auth?client_id=test".to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
        let expires_at = match code {
            GOOD_CODE => Utc::now() + ChronoDuration::seconds(3600),
            EXPIRED_CODE => Utc::now() - ChronoDuration::seconds(1),
            _ => {
                return Err(Error::Api {
                    status: 400,
                    message: "invalid_grant".to_string(),
                })
            }
        };
        Ok(AccessToken {
            access_token: format!("token-for-{}", code),
            expires_at: Some(expires_at),
        })
    }

    async fn resolve_email(&self, _token: &AccessToken) -> Result<String> {
        Ok(USER_EMAIL.to_string())
    }
}

/// Usage sheet in memory; `rows()[0]` is the label row
pub struct MemoryUsageStore {
    rows: Mutex<Vec<Vec<String>>>,
}

impl MemoryUsageStore {
    pub fn new(rows: Vec<Vec<&str>>) -> Self {
        Self {
            rows: Mutex::new(
                rows.into_iter()
                    .map(|r| r.into_iter().map(str::to_string).collect())
                    .collect(),
            ),
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }

    fn cell(value: &UsageValue) -> String {
        match value {
            UsageValue::Int(n) => n.to_string(),
            UsageValue::Text(s) => s.clone(),
        }
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn labels(&self) -> Result<Vec<String>> {
        Ok(self.rows.lock().unwrap()[0].clone())
    }

    async fn find_row(&self, email: &str) -> Result<Option<u32>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .skip(1)
            .position(|r| r.first().map_or(false, |c| c.eq_ignore_ascii_case(email)))
            .map(|i| i as u32 + 2))
    }

    async fn row_values(&self, row: u32) -> Result<Vec<String>> {
        Ok(self.rows.lock().unwrap()[row as usize - 1].clone())
    }

    async fn append_row(&self, values: &[UsageValue]) -> Result<()> {
        let row = values.iter().map(Self::cell).collect();
        self.rows.lock().unwrap().push(row);
        Ok(())
    }

    async fn update_row(&self, row: u32, values: &[UsageValue]) -> Result<()> {
        let cells = values.iter().map(Self::cell).collect();
        self.rows.lock().unwrap()[row as usize - 1] = cells;
        Ok(())
    }
}
