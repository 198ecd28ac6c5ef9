//! Hashtag, mention and URL extraction.
//!
//! All three run on the original (pre-clean) text so casing and symbols survive.
//! Results are distinct and sorted, so callers get a stable set-as-list.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

// \w is Unicode-aware in the regex crate, same as the cleaner's allow-list.
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").expect("hashtag regex"));
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("mention regex"));
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    // Scheme + conservative URL chars: letters, digits, the `$`..`_` ASCII range,
    // a few extra symbols, and percent-encoded octets.
    Regex::new(r"https?://(?:[a-zA-Z0-9$-_@.&+!*\\(),]|%[0-9a-fA-F]{2})+").expect("url regex")
});

/// Extract hashtags like `#Rust`, returned without the `#`, case preserved.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    captures_distinct(&HASHTAG_RE, text)
}

/// Extract mentions like `@user`, returned without the `@`.
pub fn extract_mentions(text: &str) -> Vec<String> {
    captures_distinct(&MENTION_RE, text)
}

/// Extract `http`/`https` URLs.
pub fn extract_urls(text: &str) -> Vec<String> {
    let set: BTreeSet<String> = URL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    set.into_iter().collect()
}

/// Number of `#tag` occurrences (not distinct). Used by the spam heuristic.
pub(crate) fn hashtag_occurrences(text: &str) -> usize {
    HASHTAG_RE.find_iter(text).count()
}

fn captures_distinct(re: &Regex, text: &str) -> Vec<String> {
    let set: BTreeSet<String> = re
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    set.into_iter().collect()
}
