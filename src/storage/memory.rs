//! In-memory engagement storage.
//!
//! Mirrors the hosted backend's semantics for development and testing:
//! comments come back oldest first, likes are append-only, and view counts
//! are incremented while holding the table lock so concurrent viewers never
//! lose an update.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{Comment, Like, NewComment, NewLike, ViewCount};
use crate::storage::EngagementStore;

#[derive(Debug, Default)]
struct Tables {
    next_id: u64,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    view_counts: HashMap<String, ViewCount>,
}

impl Tables {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// In-process engagement store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All likes recorded for an article, in insertion order.
    pub async fn likes(&self, article_slug: &str) -> Vec<Like> {
        let tables = self.tables.lock().await;
        tables
            .likes
            .iter()
            .filter(|l| l.article_slug == article_slug)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EngagementStore for MemoryStore {
    async fn select_comments(&self, article_slug: &str) -> Result<Vec<Comment>> {
        let tables = self.tables.lock().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.article_slug == article_slug)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let mut tables = self.tables.lock().await;
        let row = Comment {
            id: tables.next_id(),
            article_slug: comment.article_slug.clone(),
            author_name: comment.author_name.clone(),
            author_email: comment.author_email.clone(),
            content: comment.content.clone(),
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.comments.push(row.clone());
        Ok(row)
    }

    async fn count_likes(&self, article_slug: &str) -> Result<u64> {
        let tables = self.tables.lock().await;
        let count = tables
            .likes
            .iter()
            .filter(|l| l.article_slug == article_slug)
            .count();
        Ok(count as u64)
    }

    async fn insert_like(&self, like: &NewLike) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let row = Like {
            id: tables.next_id(),
            article_slug: like.article_slug.clone(),
            user_id: like.user_id.clone(),
            ip_address: like.ip_address.clone(),
            created_at: Utc::now(),
        };
        tables.likes.push(row);
        Ok(())
    }

    async fn select_view_count(&self, article_slug: &str) -> Result<Option<i64>> {
        let tables = self.tables.lock().await;
        Ok(tables.view_counts.get(article_slug).map(|v| v.views))
    }

    async fn increment_view_count(&self, article_slug: &str) -> Result<i64> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let row = tables
            .view_counts
            .entry(article_slug.to_string())
            .or_insert_with(|| ViewCount {
                id,
                article_slug: article_slug.to_string(),
                views: 0,
                updated_at: Utc::now(),
            });
        row.views += 1;
        row.updated_at = Utc::now();
        Ok(row.views)
    }
}
