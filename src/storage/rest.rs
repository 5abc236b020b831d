//! Hosted engagement storage over the relational backend's REST API.
//!
//! ## Request Layout
//!
//! ```text
//! GET  {url}/rest/v1/comments?select=*&article_slug=eq.{slug}&order=created_at.asc
//! POST {url}/rest/v1/comments                    (Prefer: return=representation)
//! HEAD {url}/rest/v1/likes?select=*&article_slug=eq.{slug}   (Prefer: count=exact)
//! POST {url}/rest/v1/likes                       (Prefer: return=minimal)
//! GET  {url}/rest/v1/view_counts?select=views&article_slug=eq.{slug}
//! POST {url}/rest/v1/rpc/increment_view_count    {"slug": ...}
//! ```
//!
//! Every request carries the anonymous key both as `apikey` and as a bearer
//! credential.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Comment, EngagementConfig, NewComment, NewLike};
use crate::storage::EngagementStore;
use crate::utils::http::check_status;
use crate::utils::url::join;

const SERVICE: &str = "engagement";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
/// Error code for "single row requested, zero rows found".
const NO_ROWS: &str = "PGRST116";

/// REST-backed engagement store.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct ViewsRow {
    views: i64,
}

impl RestStore {
    /// Create a store sharing the given HTTP client.
    pub fn new(client: Client, config: &EngagementConfig) -> Self {
        Self {
            client,
            base_url: join(&config.url, "rest/v1"),
            anon_key: config.anon_key.clone(),
        }
    }

    fn table(&self, name: &str) -> String {
        join(&self.base_url, name)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| AppError::config(format!("engagement key is not a valid header: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|e| AppError::config(format!("engagement key is not a valid header: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        Ok(builder.headers(self.auth_headers()?))
    }

    fn eq(value: &str) -> String {
        format!("eq.{value}")
    }
}

/// Total from a `Content-Range` header (`0-9/42` or `*/42`).
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl EngagementStore for RestStore {
    async fn select_comments(&self, article_slug: &str) -> Result<Vec<Comment>> {
        let request = self.authed(self.client.get(self.table("comments")).query(&[
            ("select", "*".to_string()),
            ("article_slug", Self::eq(article_slug)),
            ("order", "created_at.asc".to_string()),
        ]))?;
        let response = check_status(SERVICE, request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let request = self.authed(
            self.client
                .post(self.table("comments"))
                .header("Prefer", "return=representation")
                .header(ACCEPT, SINGLE_OBJECT)
                .json(&[comment]),
        )?;
        let response = check_status(SERVICE, request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn count_likes(&self, article_slug: &str) -> Result<u64> {
        let request = self.authed(
            self.client
                .head(self.table("likes"))
                .header("Prefer", "count=exact")
                .query(&[
                    ("select", "*".to_string()),
                    ("article_slug", Self::eq(article_slug)),
                ]),
        )?;
        let response = check_status(SERVICE, request.send().await?).await?;
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::backend(SERVICE, 200, None, "missing Content-Range"))?;
        parse_content_range_total(range).ok_or_else(|| {
            AppError::backend(SERVICE, 200, None, format!("bad Content-Range: {range}"))
        })
    }

    async fn insert_like(&self, like: &NewLike) -> Result<()> {
        let request = self.authed(
            self.client
                .post(self.table("likes"))
                .header("Prefer", "return=minimal")
                .json(&[like]),
        )?;
        check_status(SERVICE, request.send().await?).await?;
        Ok(())
    }

    async fn select_view_count(&self, article_slug: &str) -> Result<Option<i64>> {
        let request = self.authed(
            self.client
                .get(self.table("view_counts"))
                .header(ACCEPT, SINGLE_OBJECT)
                .query(&[
                    ("select", "views".to_string()),
                    ("article_slug", Self::eq(article_slug)),
                ]),
        )?;
        match check_status(SERVICE, request.send().await?).await {
            Ok(response) => {
                let row: ViewsRow = response.json().await?;
                Ok(Some(row.views))
            }
            Err(AppError::Backend { code: Some(code), .. }) if code == NO_ROWS => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn increment_view_count(&self, article_slug: &str) -> Result<i64> {
        let request = self.authed(
            self.client
                .post(self.table("rpc/increment_view_count"))
                .json(&serde_json::json!({ "slug": article_slug })),
        )?;
        let response = check_status(SERVICE, request.send().await?).await?;
        let value: Option<i64> = response.json().await?;
        Ok(value.unwrap_or(0))
    }
}
