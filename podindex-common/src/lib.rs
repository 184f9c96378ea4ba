//! # Podcast Index Common Library
//!
//! Shared code for the podcast index dashboard:
//! - Tag, block and document models returned by the tag store
//! - Typed tag filter expressions
//! - Configuration loading
//! - Expiring cache with an injectable clock
//! - Bounded task group for parallel fetches

pub mod cache;
pub mod config;
pub mod error;
pub mod query;
pub mod tag;
pub mod task_group;

pub use error::{Error, Result};
pub use query::TagFilter;
pub use tag::{Block, Document, Tag};
