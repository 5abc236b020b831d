//! Engagement rows owned by the relational backend.
//!
//! All rows are keyed by article slug. There is no foreign key to the content
//! backend; the slug is matched by value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::text::is_valid_email;

/// A visitor comment on an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub article_slug: String,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert payload for a comment; id and timestamps are generated by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub article_slug: String,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    pub content: String,
}

impl NewComment {
    pub fn new(
        article_slug: impl Into<String>,
        author_name: impl Into<String>,
        author_email: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            article_slug: article_slug.into(),
            author_name: author_name.into(),
            // An empty form field means "no email".
            author_email: author_email.filter(|e| !e.trim().is_empty()),
            content: content.into(),
        }
    }

    /// Reject comments the site would never submit.
    pub fn validate(&self) -> Result<()> {
        if self.article_slug.trim().is_empty() {
            return Err(AppError::validation("comment has no article slug"));
        }
        if self.author_name.trim().is_empty() {
            return Err(AppError::validation("comment author name is blank"));
        }
        if self.content.trim().is_empty() {
            return Err(AppError::validation("comment content is blank"));
        }
        if let Some(email) = &self.author_email {
            if !is_valid_email(email) {
                return Err(AppError::validation(format!(
                    "comment author email is invalid: {email}"
                )));
            }
        }
        Ok(())
    }
}

/// A like on an article. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    pub article_slug: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a like.
///
/// `ip_address` carries the originating-address tag, never the raw address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLike {
    pub article_slug: String,
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
}

/// Per-article view counter row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCount {
    pub id: String,
    pub article_slug: String,
    pub views: i64,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_comment_drops_blank_email() {
        let c = NewComment::new("hello", "Kim", Some("  ".to_string()), "Nice");
        assert!(c.author_email.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert!(NewComment::new("hello", " ", None, "Nice").validate().is_err());
        assert!(NewComment::new("hello", "Kim", None, "\n").validate().is_err());
        assert!(NewComment::new("", "Kim", None, "Nice").validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_email() {
        let c = NewComment::new("hello", "Kim", Some("not-an-email".to_string()), "Nice");
        assert!(c.validate().is_err());
    }

    #[test]
    fn new_comment_serializes_without_missing_email() {
        let c = NewComment::new("hello", "Kim", None, "Nice");
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("author_email").is_none());
    }
}
