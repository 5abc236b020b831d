// src/services/content.rs

//! Content backend client.
//!
//! Reads articles, categories and authors. Every call issues at most one
//! request and returns records with media URLs already normalized against the
//! content base.

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::{Article, Author, Category, ContentConfig, ContentResponse};
use crate::query::{ArticleQuery, SortKey};
use crate::services::FailurePolicy;
use crate::utils::http::check_status;
use crate::utils::url::join;

const SERVICE: &str = "content";

/// Relations expanded for article listings.
const LISTING_RELATIONS: [&str; 3] = ["cover", "author", "category"];
/// Page size cap for search results.
pub const SEARCH_PAGE_SIZE: u32 = 20;
/// Default number of featured articles.
pub const DEFAULT_FEATURED_LIMIT: u32 = 5;

/// Client for the headless content backend.
#[derive(Clone)]
pub struct ContentClient {
    client: Client,
    base_url: String,
    api_url: String,
    api_token: Option<String>,
    search_policy: FailurePolicy,
}

impl ContentClient {
    /// Create a client sharing the given HTTP client.
    pub fn new(client: Client, config: &ContentConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            client,
            api_url: join(&base_url, "api"),
            base_url,
            api_token: config.api_token.clone(),
            search_policy: FailurePolicy::Mask,
        }
    }

    /// Override how search failures are reported.
    pub fn with_search_policy(mut self, policy: FailurePolicy) -> Self {
        self.search_policy = policy;
        self
    }

    /// Content base URL used to resolve relative media URLs.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{api}/{path}?{query}` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &ArticleQuery) -> Result<T> {
        let mut url = join(&self.api_url, path);
        let qs = query.to_query_string();
        if !qs.is_empty() {
            url.push('?');
            url.push_str(&qs);
        }

        log::debug!("GET {url}");
        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let response = check_status(SERVICE, request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// GET a single record, mapping a backend 404 to `None`.
    async fn get_one<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ArticleQuery,
    ) -> Result<Option<T>> {
        match self.get_json::<ContentResponse<Option<T>>>(path, query).await {
            Ok(resp) => Ok(resp.data),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn normalize_articles(&self, articles: &mut [Article]) {
        for article in articles {
            article.normalize_media(&self.base_url);
        }
    }

    /// List articles; the backend envelope is returned as-is.
    pub async fn list_articles(&self, query: &ArticleQuery) -> Result<ContentResponse<Vec<Article>>> {
        let mut resp: ContentResponse<Vec<Article>> = self.get_json("articles", query).await?;
        self.normalize_articles(&mut resp.data);
        Ok(resp)
    }

    /// Fetch a fully-populated article by slug.
    ///
    /// Results are sorted by id, so if a slug were ever duplicated the
    /// oldest entry wins.
    pub async fn get_article_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let query = ArticleQuery::new()
            .populate_all()
            .filter("slug", slug)
            .sort(SortKey::asc("id"));
        let resp = self.list_articles(&query).await?;

        if resp.data.len() > 1 {
            log::warn!(
                "Slug '{}' matched {} articles; using id {}",
                slug,
                resp.data.len(),
                resp.data[0].id
            );
        }
        Ok(resp.data.into_iter().next())
    }

    /// Fetch a fully-populated article by id (numeric or document id).
    pub async fn get_article_by_id(&self, id: &str) -> Result<Option<Article>> {
        let query = ArticleQuery::new().populate_all();
        let mut article: Option<Article> =
            self.get_one(&format!("articles/{id}"), &query).await?;
        if let Some(article) = article.as_mut() {
            article.normalize_media(&self.base_url);
        }
        Ok(article)
    }

    /// Slugs of up to `limit` articles, for pre-generating article pages.
    pub async fn list_article_slugs(&self, limit: u32) -> Result<Vec<String>> {
        let query = ArticleQuery::new().page_size(limit);
        let resp = self.list_articles(&query).await?;
        Ok(resp.data.into_iter().map(|a| a.slug).collect())
    }

    pub async fn list_categories(&self) -> Result<ContentResponse<Vec<Category>>> {
        self.get_json("categories", &ArticleQuery::new()).await
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let query = ArticleQuery::new().filter("slug", slug);
        let resp: ContentResponse<Vec<Category>> = self.get_json("categories", &query).await?;
        Ok(resp.data.into_iter().next())
    }

    /// List authors with their avatars.
    pub async fn list_authors(&self) -> Result<ContentResponse<Vec<Author>>> {
        let query = ArticleQuery::new().populate(["avatar"]);
        let mut resp: ContentResponse<Vec<Author>> = self.get_json("authors", &query).await?;
        for author in &mut resp.data {
            author.normalize_media(&self.base_url);
        }
        Ok(resp)
    }

    pub async fn get_author_by_id(&self, id: &str) -> Result<Option<Author>> {
        let query = ArticleQuery::new().populate(["avatar"]);
        let mut author: Option<Author> = self.get_one(&format!("authors/{id}"), &query).await?;
        if let Some(author) = author.as_mut() {
            author.normalize_media(&self.base_url);
        }
        Ok(author)
    }

    /// Newest articles first, limited to `limit`.
    pub async fn get_featured_articles(&self, limit: u32) -> Result<Vec<Article>> {
        let query = ArticleQuery::new()
            .populate(LISTING_RELATIONS)
            .sort(SortKey::desc("publishedAt"))
            .page_size(limit);
        Ok(self.list_articles(&query).await?.data)
    }

    /// Newest articles first within one category.
    pub async fn get_articles_by_category(&self, category_slug: &str) -> Result<Vec<Article>> {
        let query = ArticleQuery::new()
            .populate(LISTING_RELATIONS)
            .filter("category.slug", category_slug)
            .sort(SortKey::desc("publishedAt"));
        Ok(self.list_articles(&query).await?.data)
    }

    /// Substring search over title, description and content.
    ///
    /// A blank query returns nothing without touching the network. Failures
    /// follow the search policy (masked to an empty list by default).
    pub async fn search_articles(&self, query: &str) -> Result<Vec<Article>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let request = ArticleQuery::new()
            .populate(LISTING_RELATIONS)
            .search(query)
            .sort(SortKey::desc("publishedAt"))
            .page_size(SEARCH_PAGE_SIZE);
        let result = self.list_articles(&request).await.map(|resp| resp.data);
        self.search_policy.apply("searching articles", result)
    }
}
