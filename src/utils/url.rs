// src/utils/url.rs

//! URL manipulation utilities.

/// Whether a URL is already absolute (`http://` or `https://`).
pub fn is_absolute(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolve a media URL returned by the content backend.
///
/// Absolute URLs (including CDN URLs) pass through unchanged; relative ones
/// are prefixed with the content base exactly once, so the function is
/// idempotent.
///
/// # Examples
/// ```
/// use monolink::utils::url::normalize_media_url;
///
/// assert_eq!(
///     normalize_media_url("http://localhost:1337", "/uploads/x.png"),
///     "http://localhost:1337/uploads/x.png"
/// );
/// ```
pub fn normalize_media_url(base: &str, url: &str) -> String {
    if is_absolute(url) {
        return url.to_string();
    }

    let base = base.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

/// Normalize an optional media URL; `None` and empty strings stay `None`.
pub fn normalize_optional(base: &str, url: Option<&str>) -> Option<String> {
    url.filter(|u| !u.is_empty())
        .map(|u| normalize_media_url(base, u))
}

/// Join an API base and a path, tolerating slashes on either side.
pub fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Extract domain from a URL.
///
/// # Examples
/// ```
/// use monolink::utils::url::get_domain;
///
/// assert_eq!(
///     get_domain("https://res.cloudinary.com/demo/image/upload/x.png"),
///     Some("res.cloudinary.com".to_string())
/// );
/// ```
pub fn get_domain(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed.host_str().map(|h| h.to_lowercase())
}
