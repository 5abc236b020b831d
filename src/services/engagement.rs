// src/services/engagement.rs

//! Engagement client: comments, likes and view counts.
//!
//! Every operation is keyed by article slug and issues at most one backend
//! call. Under the default [`FailurePolicy::Mask`] failures are logged and
//! replaced by a neutral value, so callers always get `Ok`.
//!
//! Likes are not deduplicated here. "Has this viewer already liked" is a
//! client-side check; the backend has no uniqueness constraint on
//! (article, user), so repeated calls append repeated rows.

use crate::error::Result;
use crate::models::{Comment, NewComment, NewLike};
use crate::services::FailurePolicy;
use crate::storage::EngagementStore;
use crate::utils::address_tag;

/// Client for engagement data over any [`EngagementStore`].
pub struct EngagementClient<S> {
    store: S,
    policy: FailurePolicy,
}

impl<S: EngagementStore> EngagementClient<S> {
    /// Create a client that masks failures.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, FailurePolicy::Mask)
    }

    pub fn with_policy(store: S, policy: FailurePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Comments for an article, oldest first.
    pub async fn list_comments(&self, article_slug: &str) -> Result<Vec<Comment>> {
        let result = self.store.select_comments(article_slug).await;
        self.policy.apply("fetching comments", result)
    }

    /// Validate and insert a comment; returns the persisted row.
    pub async fn add_comment(&self, comment: NewComment) -> Result<Option<Comment>> {
        let result = match comment.validate() {
            Ok(()) => self.store.insert_comment(&comment).await.map(Some),
            Err(e) => Err(e),
        };
        self.policy.apply("adding comment", result)
    }

    /// Number of likes for an article.
    pub async fn count_likes(&self, article_slug: &str) -> Result<u64> {
        let result = self.store.count_likes(article_slug).await;
        self.policy.apply("fetching like count", result)
    }

    /// Append a like. No existing-like check is made.
    ///
    /// `address` is stored only as a one-way tag.
    pub async fn add_like(
        &self,
        article_slug: &str,
        user_id: Option<&str>,
        address: Option<&str>,
    ) -> Result<bool> {
        let like = NewLike {
            article_slug: article_slug.to_string(),
            user_id: user_id.map(str::to_string),
            ip_address: address.map(address_tag),
        };
        let result = self.store.insert_like(&like).await.map(|()| true);
        self.policy.apply("adding like", result)
    }

    /// Current view count; an article without a counter row has 0 views.
    pub async fn get_view_count(&self, article_slug: &str) -> Result<i64> {
        let result = self
            .store
            .select_view_count(article_slug)
            .await
            .map(|views| views.unwrap_or(0));
        self.policy.apply("fetching view count", result)
    }

    /// Increment the view count on the backend and return the new value.
    pub async fn increment_view_count(&self, article_slug: &str) -> Result<i64> {
        let result = self.store.increment_view_count(article_slug).await;
        self.policy.apply("incrementing view count", result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::storage::MemoryStore;

    /// Store whose every call fails like an unreachable backend.
    struct DownStore;

    fn down() -> AppError {
        AppError::backend("engagement", 503, None, "unavailable")
    }

    #[async_trait]
    impl EngagementStore for DownStore {
        async fn select_comments(&self, _: &str) -> Result<Vec<Comment>> {
            Err(down())
        }
        async fn insert_comment(&self, _: &NewComment) -> Result<Comment> {
            Err(down())
        }
        async fn count_likes(&self, _: &str) -> Result<u64> {
            Err(down())
        }
        async fn insert_like(&self, _: &NewLike) -> Result<()> {
            Err(down())
        }
        async fn select_view_count(&self, _: &str) -> Result<Option<i64>> {
            Err(down())
        }
        async fn increment_view_count(&self, _: &str) -> Result<i64> {
            Err(down())
        }
    }

    #[tokio::test]
    async fn masked_failures_return_neutral_values() {
        let client = EngagementClient::new(DownStore);
        assert_eq!(client.policy(), FailurePolicy::Mask);

        assert!(client.list_comments("a").await.unwrap().is_empty());
        assert!(
            client
                .add_comment(NewComment::new("a", "Kim", None, "hi"))
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(client.count_likes("a").await.unwrap(), 0);
        assert!(!client.add_like("a", None, None).await.unwrap());
        assert_eq!(client.get_view_count("a").await.unwrap(), 0);
        assert_eq!(client.increment_view_count("a").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn propagate_policy_surfaces_failures() {
        let client = EngagementClient::with_policy(DownStore, FailurePolicy::Propagate);
        assert!(client.list_comments("a").await.is_err());
        assert!(client.count_likes("a").await.is_err());
        assert!(client.increment_view_count("a").await.is_err());
    }

    #[tokio::test]
    async fn add_comment_returns_persisted_row() {
        let client = EngagementClient::new(MemoryStore::new());
        let comment = client
            .add_comment(NewComment::new("a", "Kim", Some("kim@example.com".into()), "hi"))
            .await
            .unwrap()
            .unwrap();
        assert!(!comment.id.is_empty());
        assert_eq!(comment.author_email.as_deref(), Some("kim@example.com"));

        let listed = client.list_comments("a").await.unwrap();
        assert_eq!(listed, vec![comment]);
    }

    #[tokio::test]
    async fn invalid_comment_is_masked_to_none() {
        let client = EngagementClient::new(MemoryStore::new());
        let result = client
            .add_comment(NewComment::new("a", "  ", None, "hi"))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(client.list_comments("a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn likes_are_not_deduplicated_and_address_is_tagged() {
        let client = EngagementClient::new(MemoryStore::new());
        assert!(client.add_like("a", Some("u1"), Some("203.0.113.7")).await.unwrap());
        assert!(client.add_like("a", Some("u1"), Some("203.0.113.7")).await.unwrap());
        assert_eq!(client.count_likes("a").await.unwrap(), 2);

        let likes = client.store().likes("a").await;
        let tag = likes[0].ip_address.as_deref().unwrap();
        assert_ne!(tag, "203.0.113.7");
        assert_eq!(tag, address_tag("203.0.113.7"));
    }

    #[tokio::test]
    async fn missing_view_row_is_zero() {
        let client = EngagementClient::new(MemoryStore::new());
        assert_eq!(client.get_view_count("never-viewed").await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let client = Arc::new(EngagementClient::new(MemoryStore::new()));
        client.increment_view_count("a").await.unwrap();
        let before = client.get_view_count("a").await.unwrap();

        let (first, second) = tokio::join!(
            {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.increment_view_count("a").await })
            },
            {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.increment_view_count("a").await })
            }
        );
        let mut returned = vec![first.unwrap().unwrap(), second.unwrap().unwrap()];
        returned.sort();

        assert_eq!(returned, vec![before + 1, before + 2]);
        assert_eq!(client.get_view_count("a").await.unwrap(), before + 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_concurrent_increments() {
        let client = Arc::new(EngagementClient::new(MemoryStore::new()));
        let tasks = (0..50).map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.increment_view_count("busy").await })
        });
        for joined in futures::future::join_all(tasks).await {
            joined.unwrap().unwrap();
        }
        assert_eq!(client.get_view_count("busy").await.unwrap(), 50);
    }
}
