// src/error.rs

//! Unified error handling for the blog data layer.

use std::fmt;

use thiserror::Error;

/// Result type alias for monolink operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (includes timeouts)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Page cache could not be updated
    #[error("Page cache error: {0}")]
    Cache(String),

    /// A backend answered with a non-success status
    #[error("{service} returned {status}{}: {message}", code_suffix(.code))]
    Backend {
        service: &'static str,
        status: u16,
        code: Option<String>,
        message: String,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a backend error from a response status and message.
    pub fn backend(
        service: &'static str,
        status: u16,
        code: Option<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Backend {
            service,
            status,
            code,
            message: message.to_string(),
        }
    }

    /// HTTP status reported by the backend, if this is a backend error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the backend reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" ({c})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display_includes_code() {
        let err = AppError::backend("engagement", 406, Some("PGRST116".into()), "no rows");
        assert_eq!(err.to_string(), "engagement returned 406 (PGRST116): no rows");
    }

    #[test]
    fn backend_error_display_without_code() {
        let err = AppError::backend("content", 500, None, "boom");
        assert_eq!(err.to_string(), "content returned 500: boom");
    }

    #[test]
    fn not_found_detection() {
        assert!(AppError::backend("content", 404, None, "missing").is_not_found());
        assert!(!AppError::validation("bad").is_not_found());
    }
}
