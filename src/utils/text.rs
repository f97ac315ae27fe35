//! Text helpers for table cells and URL slugs.

use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("slug filter regex should be valid"));
static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s-]+").expect("slug separator regex should be valid"));

/// Truncate a string to a maximum length, handling multi-byte characters properly.
/// Appends "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Derive a URL slug from a page title.
///
/// Lowercases, drops everything except ASCII letters, digits, spaces and
/// hyphens, then collapses runs of whitespace and hyphens into one hyphen.
pub fn slugify(title: &str) -> String {
    let lower = title.trim().to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lower, "");
    let joined = SLUG_SEPARATORS.replace_all(cleaned.trim(), "-");
    joined.trim_matches('-').to_string()
}

/// Case-insensitive substring match used by list filters.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
