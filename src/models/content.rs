//! Content backend records: articles, categories, authors and media.
//!
//! These are read-only from this crate's point of view. Field names follow
//! the backend's camelCase wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::url::normalize_media_url;

/// Response envelope returned by every content endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResponse<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Meta,
}

/// Envelope metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Pagination block reported by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

/// A published article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    #[serde(default)]
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub slug: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover: Option<Media>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub author: Option<Author>,
}

impl Article {
    /// Resolve every embedded media URL against the content base.
    pub fn normalize_media(&mut self, base_url: &str) {
        if let Some(cover) = self.cover.as_mut() {
            cover.normalize(base_url);
        }
        if let Some(author) = self.author.as_mut() {
            author.normalize_media(base_url);
        }
    }
}

/// Article category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    #[serde(default)]
    pub document_id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Article author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    #[serde(default)]
    pub document_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<Media>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Author {
    pub fn normalize_media(&mut self, base_url: &str) {
        if let Some(avatar) = self.avatar.as_mut() {
            avatar.normalize(base_url);
        }
    }
}

/// An uploaded media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub alternative_text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub formats: Option<MediaFormats>,
}

/// Derived renditions generated by the content backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaFormats {
    #[serde(default)]
    pub thumbnail: Option<MediaFormat>,
    #[serde(default)]
    pub small: Option<MediaFormat>,
    #[serde(default)]
    pub medium: Option<MediaFormat>,
    #[serde(default)]
    pub large: Option<MediaFormat>,
}

/// One rendition of a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFormat {
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub size: f64,
}

/// Rendition names, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatSize {
    Thumbnail,
    Small,
    #[default]
    Medium,
    Large,
}

impl Media {
    /// URL of the requested rendition, falling back to the original upload.
    pub fn url_for(&self, size: FormatSize) -> &str {
        let formats = match &self.formats {
            Some(f) => f,
            None => return &self.url,
        };
        let format = match size {
            FormatSize::Thumbnail => formats.thumbnail.as_ref(),
            FormatSize::Small => formats.small.as_ref(),
            FormatSize::Medium => formats.medium.as_ref(),
            FormatSize::Large => formats.large.as_ref(),
        };
        format.map(|f| f.url.as_str()).unwrap_or(&self.url)
    }

    fn normalize(&mut self, base_url: &str) {
        self.url = normalize_media_url(base_url, &self.url);
        if let Some(formats) = self.formats.as_mut() {
            for format in [
                &mut formats.thumbnail,
                &mut formats.small,
                &mut formats.medium,
                &mut formats.large,
            ]
            .into_iter()
            .flatten()
            {
                format.url = normalize_media_url(base_url, &format.url);
            }
        }
    }
}
