//! Browser sessions and the per-request context

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::usage::{QuotaStatus, UsageRecord};

pub const SESSION_COOKIE: &str = "podindex_session";

/// Signed-in user, keyed by the session cookie
#[derive(Debug, Clone)]
pub struct Session {
    pub email: String,
    pub usage: UsageRecord,
    pub created_at: DateTime<Utc>,
}

/// Everything a page handler knows about the caller
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session_id: Uuid,
    pub email: String,
    pub usage: UsageRecord,
    pub quota: QuotaStatus,
}

/// In-process session table
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, email: &str, usage: UsageRecord) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            email: email.to_string(),
            usage,
            created_at: Utc::now(),
        };
        self.sessions.write().await.insert(id, session);
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn update_usage(&self, id: &Uuid, usage: UsageRecord) {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.usage = usage;
        }
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Session id from the request's `Cookie` headers, if well-formed
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: &Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
