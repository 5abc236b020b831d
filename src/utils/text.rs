// src/utils/text.rs

//! Text helpers shared by the clients and the CLI.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

const WORDS_PER_MINUTE: usize = 200;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static regex"));
static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("static regex"));
static HTML_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

/// Turn arbitrary text into a URL-safe slug.
///
/// # Examples
/// ```
/// use monolink::utils::text::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// ```
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lower, "");
    let dashed = SLUG_SEPARATORS.replace_all(&stripped, "-");
    dashed.trim_matches('-').to_string()
}

/// Whether `slug` is already in canonical slug form.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

/// Cut text to at most `max_len` graphemes, backing off to a word boundary.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max_len {
        return text.to_string();
    }

    let cut: String = graphemes[..max_len].concat();
    // Drop a trailing partial word.
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) if !cut[idx..].trim().is_empty() => cut[..idx].trim_end(),
        _ => cut.trim_end(),
    };
    format!("{trimmed}...")
}

/// Plain-text excerpt of rich-text content.
pub fn extract_excerpt(content: &str, max_len: usize) -> String {
    let stripped = HTML_TAGS.replace_all(content, "");
    truncate_text(stripped.trim(), max_len)
}

/// Estimated reading time in whole minutes (at least one).
pub fn reading_time_minutes(content: &str) -> usize {
    let words = content.unicode_words().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Loose email shape check used for comment input.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Rust & Async: Part 2 "), "rust-async-part-2");
        assert_eq!(slugify("snake_case_title"), "snake-case-title");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("hello-world"));
        assert!(!is_valid_slug("Hello World"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_text("short", 160), "short");
    }

    #[test]
    fn test_truncate_backs_off_to_word() {
        assert_eq!(truncate_text("the quick brown fox", 12), "the quick...");
    }

    #[test]
    fn test_truncate_counts_graphemes() {
        let text = "가나다라마바사";
        assert_eq!(truncate_text(text, 3), "가나다...");
    }

    #[test]
    fn test_extract_excerpt_strips_tags() {
        assert_eq!(
            extract_excerpt("<p>Hello <b>there</b></p>", 160),
            "Hello there"
        );
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time_minutes(""), 1);
        let long = "word ".repeat(401);
        assert_eq!(reading_time_minutes(&long), 3);
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("kim@example.com"));
        assert!(!is_valid_email("kim@example"));
        assert!(!is_valid_email("kim example@x.com"));
    }
}
