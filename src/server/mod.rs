//! HTTP surface: the revalidation webhook and a health probe.

mod revalidate;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::cache::PageCache;
use crate::error::{AppError, Result};
use crate::models::Config;

pub use revalidate::{RevalidateRequest, RevalidateResponse};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    cache: Arc<dyn PageCache>,
    secret: Arc<str>,
}

impl AppState {
    /// Build state from a validated secret and the cache to invalidate.
    pub fn new(cache: Arc<dyn PageCache>, secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(AppError::config("revalidation secret must not be empty"));
        }
        Ok(Self {
            cache,
            secret: secret.into(),
        })
    }

    pub fn from_config(config: &Config, cache: Arc<dyn PageCache>) -> Result<Self> {
        Self::new(cache, config.revalidation.secret.clone())
    }

    pub(crate) fn cache(&self) -> &dyn PageCache {
        self.cache.as_ref()
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Create the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(revalidate::router())
        .with_state(state)
}
