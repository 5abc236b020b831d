//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Headless content backend (articles, authors, categories)
    #[serde(default)]
    pub content: ContentConfig,

    /// Relational backend for comments, likes and view counts
    #[serde(default)]
    pub engagement: EngagementConfig,

    /// Media CDN used for image URLs
    #[serde(default)]
    pub cdn: CdnConfig,

    /// Revalidation endpoint settings
    #[serde(default)]
    pub revalidation: RevalidationConfig,

    /// Shared HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary key lookup.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a value from the config file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(env::CONTENT_API_URL) {
            self.content.base_url = v;
        }
        if let Some(v) = get(env::CONTENT_API_TOKEN) {
            self.content.api_token = Some(v);
        }
        if let Some(v) = get(env::ENGAGEMENT_URL) {
            self.engagement.url = v;
        }
        if let Some(v) = get(env::ENGAGEMENT_ANON_KEY) {
            self.engagement.anon_key = v;
        }
        if let Some(v) = get(env::CDN_CLOUD_NAME) {
            self.cdn.cloud_name = v;
        }
        if let Some(v) = get(env::REVALIDATE_SECRET) {
            self.revalidation.secret = v;
        }
        if let Some(v) = get(env::BIND_ADDR) {
            self.revalidation.bind_addr = v;
        }
    }

    /// Validate configuration values for basic sanity.
    ///
    /// The revalidation secret is not checked here; only the server needs it.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.content.base_url)
            .map_err(|e| AppError::validation(format!("content.base_url is invalid: {e}")))?;
        url::Url::parse(&self.engagement.url)
            .map_err(|e| AppError::validation(format!("engagement.url is invalid: {e}")))?;
        if self.engagement.anon_key.trim().is_empty() {
            return Err(AppError::validation("engagement.anon_key is empty"));
        }
        if self.cdn.cloud_name.trim().is_empty() {
            return Err(AppError::validation("cdn.cloud_name is empty"));
        }
        if self.revalidation.interval_secs == 0 {
            return Err(AppError::validation(
                "revalidation.interval_secs must be > 0",
            ));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Environment variable names recognised by [`Config::apply_env`].
pub mod env {
    pub const CONTENT_API_URL: &str = "CONTENT_API_URL";
    pub const CONTENT_API_TOKEN: &str = "CONTENT_API_TOKEN";
    pub const ENGAGEMENT_URL: &str = "ENGAGEMENT_URL";
    pub const ENGAGEMENT_ANON_KEY: &str = "ENGAGEMENT_ANON_KEY";
    pub const CDN_CLOUD_NAME: &str = "CDN_CLOUD_NAME";
    pub const REVALIDATE_SECRET: &str = "REVALIDATE_SECRET";
    pub const BIND_ADDR: &str = "MONOLINK_BIND_ADDR";
}

/// Content backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Base URL of the content backend, without the `/api` suffix
    #[serde(default = "defaults::content_base_url")]
    pub base_url: String,

    /// Optional read token sent as a bearer credential
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::content_base_url(),
            api_token: None,
        }
    }
}

/// Relational backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Project URL of the relational backend
    #[serde(default = "defaults::engagement_url")]
    pub url: String,

    /// Public (anonymous) API key
    #[serde(default = "defaults::engagement_anon_key")]
    pub anon_key: String,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            url: defaults::engagement_url(),
            anon_key: defaults::engagement_anon_key(),
        }
    }
}

/// CDN settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnConfig {
    /// CDN account (cloud) name
    #[serde(default = "defaults::cdn_cloud_name")]
    pub cloud_name: String,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            cloud_name: defaults::cdn_cloud_name(),
        }
    }
}

/// Revalidation endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidationConfig {
    /// Shared secret callers must present; required by the server
    #[serde(default)]
    pub secret: String,

    /// Address the revalidation server listens on
    #[serde(default = "defaults::bind_addr")]
    pub bind_addr: String,

    /// Seconds after which a cached page is considered stale
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl Default for RevalidationConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            bind_addr: defaults::bind_addr(),
            interval_secs: defaults::interval(),
        }
    }
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for outbound requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

mod defaults {
    pub fn content_base_url() -> String {
        "http://localhost:1337".into()
    }
    pub fn engagement_url() -> String {
        "https://demo.supabase.co".into()
    }
    pub fn engagement_anon_key() -> String {
        "demo-key".into()
    }
    pub fn cdn_cloud_name() -> String {
        "demo".into()
    }
    pub fn bind_addr() -> String {
        "127.0.0.1:3000".into()
    }
    pub fn interval() -> u64 {
        60
    }
    pub fn user_agent() -> String {
        "monolink/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }
}
