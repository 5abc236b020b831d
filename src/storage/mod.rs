//! Storage backends for engagement data.
//!
//! The relational backend owns three logical tables keyed by article slug:
//!
//! ```text
//! comments     (id, article_slug, author_name, author_email?, content, created_at, updated_at)
//! likes        (id, article_slug, user_id?, ip_address?, created_at)
//! view_counts  (id, article_slug, views, updated_at)
//! rpc increment_view_count(slug) -> integer
//! ```
//!
//! - [`RestStore`]: the hosted backend over its row-level REST API
//! - [`MemoryStore`]: in-process tables for tests and local development

pub mod memory;
pub mod rest;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Comment, NewComment, NewLike};

// Re-export for convenience
pub use memory::MemoryStore;
pub use rest::RestStore;

/// Trait for engagement storage backends.
///
/// Implementations report failures; masking is the caller's concern.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    /// Comments for an article, oldest first.
    async fn select_comments(&self, article_slug: &str) -> Result<Vec<Comment>>;

    /// Insert a comment and return the persisted row.
    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment>;

    /// Number of likes for an article, without transferring rows.
    async fn count_likes(&self, article_slug: &str) -> Result<u64>;

    /// Append a like. Duplicates are accepted.
    async fn insert_like(&self, like: &NewLike) -> Result<()>;

    /// Current view count, `None` when the article has no counter row yet.
    async fn select_view_count(&self, article_slug: &str) -> Result<Option<i64>>;

    /// Atomically increment the counter (creating it at 1) and return the new value.
    async fn increment_view_count(&self, article_slug: &str) -> Result<i64>;
}
