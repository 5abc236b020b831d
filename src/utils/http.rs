// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::Response;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create the shared asynchronous HTTP client.
///
/// Built once per process and cloned into each backend client; the timeout
/// applies to every outbound call and surfaces as [`AppError::Http`].
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Error body shape shared by both backends. Every field is optional because
/// the two backends disagree on nesting.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<NestedError>,
}

#[derive(Debug, Default, Deserialize)]
struct NestedError {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Pass a successful response through, or turn it into [`AppError::Backend`].
pub async fn check_status(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let nested = body.error.unwrap_or_default();
    let code = body.code.or(nested.name);
    let message = body
        .message
        .or(nested.message)
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            }
        });

    Err(AppError::backend(service, status.as_u16(), code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn check_status_extracts_rest_error_code() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/x")
            .with_status(406)
            .with_body(r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#)
            .create_async()
            .await;

        let resp = reqwest::get(format!("{}/x", server.url())).await.unwrap();
        let err = check_status("engagement", resp).await.unwrap_err();
        match err {
            AppError::Backend { status, code, .. } => {
                assert_eq!(status, 406);
                assert_eq!(code.as_deref(), Some("PGRST116"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn check_status_extracts_nested_content_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/x")
            .with_status(404)
            .with_body(r#"{"data":null,"error":{"status":404,"name":"NotFoundError","message":"Not Found"}}"#)
            .create_async()
            .await;

        let resp = reqwest::get(format!("{}/x", server.url())).await.unwrap();
        let err = check_status("content", resp).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "content returned 404 (NotFoundError): Not Found");
    }

    #[test]
    fn client_builds_from_default_config() {
        assert!(create_async_client(&HttpConfig::default()).is_ok());
    }
}
