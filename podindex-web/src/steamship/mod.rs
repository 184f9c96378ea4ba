//! Remote tag store access
//!
//! The tag store is the sole data source: every lookup is a tag filter
//! expression or a document fetch against the hosted Steamship API.

mod client;

pub use client::SteamshipClient;

use async_trait::async_trait;
use podindex_common::{Document, Result, Tag, TagFilter};

/// Query interface over the remote tag store
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Tags matching a filter expression
    async fn query_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>>;

    /// Full document with blocks and file tags
    async fn get_document(&self, id: &str) -> Result<Document>;
}
