//! Plain-text helpers derived from rich text: slugs, excerpts, reading time.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const ELLIPSIS: char = '…';

/// Fallback slug for titles with no usable characters.
pub const EMPTY_SLUG: &str = "untitled";

/// Turn a title into a URL slug.
///
/// ASCII letters and digits are kept (lowercased); every other run of
/// characters becomes one `-`. Returns [`EMPTY_SLUG`] if nothing survives.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c != '\'' {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}

/// Make `base` unique against `taken` by appending `-2`, `-3`, ...
#[must_use]
pub fn unique_slug<'a>(base: &str, taken: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = taken.into_iter().collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

/// Remove tags, decode common entities and collapse whitespace.
///
/// Tags are removed again after decoding, so entity-encoded markup does not
/// come back as live tags.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, " ");
    let decoded = decode_entities(&without_tags);
    let text = TAG_RE.replace_all(&decoded, " ");
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Plain-text summary of rich text, at most `max_chars` characters.
///
/// Cuts at a word boundary and appends `…` when the text was shortened.
#[must_use]
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let text = strip_tags(html);
    if text.chars().count() <= max_chars {
        return text;
    }
    if max_chars == 0 {
        return String::new();
    }

    // Leave room for the ellipsis.
    let chars: Vec<char> = text.chars().collect();
    let limit = max_chars - 1;
    let cut: String = chars[..limit].iter().collect();
    let at_boundary = chars.get(limit).is_some_and(|c| c.is_whitespace());
    let trimmed = match cut.rfind(' ') {
        _ if at_boundary => cut.as_str(),
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    let mut out = trimmed
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string();
    out.push(ELLIPSIS);
    out
}

/// Number of words in the plain text of `html`.
#[must_use]
pub fn word_count(html: &str) -> usize {
    strip_tags(html).split_whitespace().count()
}

/// Estimated reading time in whole minutes, never less than 1.
#[must_use]
pub fn reading_minutes(html: &str, words_per_minute: u32) -> u32 {
    let wpm = usize::try_from(words_per_minute.max(1)).unwrap_or(usize::MAX);
    let minutes = word_count(html).div_ceil(wpm).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Trim, lowercase and dedupe tags, dropping empties. First occurrence wins.
#[must_use]
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust & WebAssembly: 2024  "), "rust-webassembly-2024");
        assert_eq!(slugify("Don't panic"), "dont-panic");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), EMPTY_SLUG);
        assert_eq!(slugify("!!!"), EMPTY_SLUG);
    }

    #[test]
    fn test_unique_slug() {
        assert_eq!(unique_slug("post", ["other"]), "post");
        assert_eq!(unique_slug("post", ["post"]), "post-2");
        assert_eq!(unique_slug("post", ["post", "post-2", "post-3"]), "post-4");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<h1>Title</h1>\n<p>Fish &amp; chips&nbsp;today</p>"),
            "Title Fish & chips today"
        );
        assert_eq!(strip_tags("1 &lt; 2 and 3 &gt; 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn test_strip_tags_drops_encoded_markup() {
        assert_eq!(
            strip_tags("&lt;script&gt;alert(1)&lt;/script&gt;"),
            "alert(1)"
        );
        assert_eq!(strip_tags("&lt;b&gt;bold&lt;/b&gt; text"), "bold text");
    }

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("<p>Short.</p>", 200), "Short.");
    }

    #[test]
    fn test_excerpt_cuts_at_word_boundary() {
        let out = excerpt("<p>The quick brown fox jumps over the lazy dog</p>", 20);
        assert_eq!(out, "The quick brown fox…");
        assert!(out.chars().count() <= 20);
    }

    #[test]
    fn test_excerpt_drops_trailing_punctuation() {
        let out = excerpt("One, two, three, four, five", 12);
        assert_eq!(out, "One, two…");
    }

    #[test]
    fn test_reading_minutes() {
        assert_eq!(reading_minutes("", 200), 1);
        let words = "word ".repeat(401);
        assert_eq!(reading_minutes(&words, 200), 3);
        assert_eq!(reading_minutes(&format!("<p>{words}</p>"), 0), 401);
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(&[" Rust ", "rust", "", "Web", "  "]);
        assert_eq!(tags, vec!["rust", "web"]);
    }
}
