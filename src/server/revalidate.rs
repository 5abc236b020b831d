//! On-demand revalidation webhook.
//!
//! `POST /api/revalidate` with `{"path": "/articles/hello", "secret": "..."}`
//! discards cached output for that path; without a path the home page and
//! every article page are discarded. `GET` returns usage information and
//! `GET /api/revalidate/history` lists recent invalidations.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use crate::cache::{Invalidation, InvalidationKind, RevalidateTarget, default_targets};

use super::AppState;

/// Label reported when the default set was invalidated.
const ALL_PATHS: &str = "all paths";

/// Create the revalidation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/revalidate", get(usage).post(revalidate))
        .route("/api/revalidate/history", get(history))
}

/// Webhook request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub path: Option<String>,
    /// Absent is treated as a wrong secret.
    #[serde(default)]
    pub secret: String,
    /// `page` (default) or `layout`
    #[serde(default, rename = "type")]
    pub kind: Option<InvalidationKindParam>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationKindParam {
    Page,
    Layout,
}

/// Successful revalidation response.
#[derive(Debug, Serialize, Deserialize)]
pub struct RevalidateResponse {
    pub revalidated: bool,
    pub path: String,
    pub paths: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct UsageResponse {
    message: &'static str,
    usage: &'static str,
}

fn message(status: StatusCode, message: &'static str, error: Option<String>) -> Response {
    (status, Json(MessageResponse { message, error })).into_response()
}

impl RevalidateRequest {
    fn targets(&self) -> Vec<RevalidateTarget> {
        match self.path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => {
                let kind = match self.kind {
                    Some(InvalidationKindParam::Layout) => InvalidationKind::Layout,
                    _ => InvalidationKind::Page,
                };
                vec![RevalidateTarget {
                    path: path.to_string(),
                    kind,
                }]
            }
            _ => default_targets(),
        }
    }
}

/// Static usage description.
async fn usage() -> Json<UsageResponse> {
    Json(UsageResponse {
        message: "ISR Revalidation webhook endpoint",
        usage: r#"POST with { "path": "/path/to/revalidate", "secret": "your-secret" }"#,
    })
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    invalidations: Vec<Invalidation>,
}

/// Recent invalidations, oldest first. Read-only.
async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        invalidations: state.cache().history(),
    })
}

/// Invalidate cached pages (protected by the shared secret).
async fn revalidate(State(state): State<AppState>, body: Bytes) -> Response {
    let request: RevalidateRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed revalidation request");
            return message(
                StatusCode::BAD_REQUEST,
                "Error revalidating",
                Some(e.to_string()),
            );
        }
    };

    let secret_ok: bool = request
        .secret
        .as_bytes()
        .ct_eq(state.secret().as_bytes())
        .into();
    if !secret_ok {
        info!("revalidation rejected: invalid secret");
        return message(StatusCode::UNAUTHORIZED, "Invalid secret", None);
    }

    let targets = request.targets();
    for target in &targets {
        if let Err(e) = state.cache().invalidate(target) {
            error!(path = %target.path, error = %e, "revalidation failed");
            return message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error revalidating",
                Some(e.to_string()),
            );
        }
    }

    let path = match request.path.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => ALL_PATHS.to_string(),
    };
    let paths: Vec<String> = targets.into_iter().map(|t| t.path).collect();
    info!(path = %path, count = paths.len(), "revalidated");

    (
        StatusCode::OK,
        Json(RevalidateResponse {
            revalidated: true,
            path,
            paths,
            timestamp: Utc::now(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::cache::MemoryPageCache;
    use crate::server::router;

    const SECRET: &str = "s3cret";

    fn setup() -> (Router, Arc<MemoryPageCache>) {
        let cache = Arc::new(MemoryPageCache::new(Duration::from_secs(60)));
        for path in ["/", "/articles/a", "/articles/b", "/search"] {
            cache.store(path, "<html>").unwrap();
        }
        let state = AppState::new(cache.clone(), SECRET).unwrap();
        (router(state), cache)
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/revalidate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn invalidated(cache: &MemoryPageCache) -> Vec<String> {
        cache.history().into_iter().map(|i| i.target.path).collect()
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized_and_invalidates_nothing() {
        let (app, cache) = setup();
        let response = app
            .oneshot(post(r#"{"path":"/articles/a","secret":"nope"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["message"], "Invalid secret");
        assert!(cache.history().is_empty());
        assert_eq!(cache.len(), 4);
    }

    #[tokio::test]
    async fn missing_secret_is_unauthorized() {
        let (app, cache) = setup();
        let response = app
            .oneshot(post(r#"{"path":"/articles/a"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json(response).await;
        assert_eq!(body["message"], "Invalid secret");
        assert!(body.get("error").is_none());
        assert!(cache.history().is_empty());
    }

    #[tokio::test]
    async fn empty_secret_is_unauthorized() {
        let (app, cache) = setup();
        let response = app.oneshot(post(r#"{"secret":""}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(cache.history().is_empty());
    }

    #[tokio::test]
    async fn no_path_invalidates_default_set() {
        let (app, cache) = setup();
        let response = app
            .oneshot(post(&format!(r#"{{"secret":"{SECRET}"}}"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["revalidated"], true);
        assert_eq!(body["path"], "all paths");
        assert!(body["timestamp"].is_string());

        assert_eq!(invalidated(&cache), vec!["/", "/articles/[slug]"]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("/search").unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_path_uses_default_set() {
        let (app, cache) = setup();
        let response = app
            .oneshot(post(&format!(r#"{{"path":"","secret":"{SECRET}"}}"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(invalidated(&cache), vec!["/", "/articles/[slug]"]);
    }

    #[tokio::test]
    async fn path_invalidates_exactly_that_path() {
        let (app, cache) = setup();
        let response = app
            .oneshot(post(&format!(
                r#"{{"path":"/articles/a","secret":"{SECRET}"}}"#
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: RevalidateResponse = serde_json::from_value(json(response).await).unwrap();
        assert_eq!(body.path, "/articles/a");
        assert_eq!(body.paths, vec!["/articles/a"]);

        assert_eq!(invalidated(&cache), vec!["/articles/a"]);
        assert!(cache.get("/articles/a").unwrap().is_none());
        assert!(cache.get("/articles/b").unwrap().is_some());
    }

    #[tokio::test]
    async fn layout_type_invalidates_descendants() {
        let (app, cache) = setup();
        let response = app
            .oneshot(post(&format!(
                r#"{{"path":"/articles","type":"layout","secret":"{SECRET}"}}"#
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.history()[0].target.kind, InvalidationKind::Layout);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (app, cache) = setup();
        let response = app.oneshot(post("not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["message"], "Error revalidating");
        assert!(cache.history().is_empty());
    }

    #[tokio::test]
    async fn get_returns_usage_without_side_effects() {
        let (app, cache) = setup();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/revalidate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["message"], "ISR Revalidation webhook endpoint");
        assert!(body["usage"].as_str().unwrap().contains("secret"));
        assert!(cache.history().is_empty());
    }

    #[tokio::test]
    async fn history_lists_invalidations() {
        let (app, _) = setup();
        let response = app
            .clone()
            .oneshot(post(&format!(
                r#"{{"path":"/articles/a","secret":"{SECRET}"}}"#
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/revalidate/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        let entries = body["invalidations"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["target"]["path"], "/articles/a");
        assert_eq!(entries[0]["target"]["kind"], "page");
        assert_eq!(entries[0]["removed"], 1);
    }

    #[tokio::test]
    async fn health_probe() {
        let (app, _) = setup();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn empty_secret_is_rejected() {
        let cache = Arc::new(MemoryPageCache::new(Duration::from_secs(60)));
        assert!(AppState::new(cache, "  ").is_err());
    }
}
