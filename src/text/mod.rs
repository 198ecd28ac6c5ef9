// src/text/mod.rs
//! Post text pipeline: cleaning, validation, statistics, truncation.
//!
//! `TextNormalizer` only carries immutable configuration (the maximum post length),
//! so a single instance can be built at startup and shared behind an `Arc`.

pub mod extract;
pub mod rules;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::constants::{
    DEFAULT_MAX_POST_LENGTH, ELLIPSIS, HASHTAG_WARNING_COUNT, MENTION_WARNING_COUNT,
    MIN_POST_LENGTH, WORD_BREAK_RATIO,
};

pub use extract::{extract_hashtags, extract_mentions, extract_urls};

pub const ERR_EMPTY: &str = "Post cannot be empty";
pub const ERR_TOO_SHORT: &str = "Post must be at least 3 characters long";
pub const ERR_REPETITION: &str = "Post contains excessive repetition";
pub const ERR_SPAM: &str = "Post appears to be spam-like";

/// Caller bugs (bad limits), as opposed to user input problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("maximum post length must be at least 1, got {0}")]
    InvalidMaxLength(usize),
    #[error("truncation length must be at least {min}, got {got}")]
    TruncateTooShort { min: usize, got: usize },
}

/// Result of validating a post. `is_valid` holds iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Cleaned text together with the validation of that cleaned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub cleaned_text: String,
    pub outcome: ValidationOutcome,
}

/// Counts are sizes of the distinct sets, not occurrence counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatistics {
    pub original_length: usize,
    pub cleaned_length: usize,
    pub word_count: usize,
    pub character_count: usize,
    pub hashtag_count: usize,
    pub mention_count: usize,
    pub url_count: usize,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNormalizer {
    max_length: usize,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_POST_LENGTH,
        }
    }
}

impl TextNormalizer {
    pub fn with_max_length(max_length: usize) -> Result<Self, TextError> {
        if max_length == 0 {
            return Err(TextError::InvalidMaxLength(max_length));
        }
        Ok(Self { max_length })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn clean(&self, text: &str) -> String {
        clean_text(text)
    }

    /// Validate against the configured maximum length.
    pub fn validate(&self, text: &str) -> ValidationOutcome {
        validate_post(text, self.max_length)
    }

    /// Validate against an explicit per-call maximum.
    pub fn validate_with_max(
        &self,
        text: &str,
        max_length: usize,
    ) -> Result<ValidationOutcome, TextError> {
        if max_length == 0 {
            return Err(TextError::InvalidMaxLength(max_length));
        }
        Ok(validate_post(text, max_length))
    }

    /// Clean first, then validate the cleaned text.
    pub fn clean_and_validate(&self, text: &str) -> CleanedPost {
        let cleaned_text = clean_text(text);
        let outcome = self.validate(&cleaned_text);
        CleanedPost {
            cleaned_text,
            outcome,
        }
    }

    /// Length fields come from the cleaned text; tags, mentions and URLs
    /// from the original so exact-case tokens survive.
    pub fn statistics(&self, text: &str) -> PostStatistics {
        let cleaned = clean_text(text);
        let hashtags = extract_hashtags(text);
        let mentions = extract_mentions(text);
        let urls = extract_urls(text);
        let cleaned_length = cleaned.chars().count();

        PostStatistics {
            original_length: text.chars().count(),
            cleaned_length,
            word_count: cleaned.split_whitespace().count(),
            character_count: cleaned_length,
            hashtag_count: hashtags.len(),
            mention_count: mentions.len(),
            url_count: urls.len(),
            hashtags,
            mentions,
            urls,
        }
    }

    /// Shorten to `max_length` chars (configured maximum when `None`), ending in `...`.
    /// Prefers a word break when the last space is not too early in the cut.
    pub fn truncate(&self, text: &str, max_length: Option<usize>) -> Result<String, TextError> {
        let max = max_length.unwrap_or(self.max_length);
        let min = ELLIPSIS.chars().count();
        if max < min {
            return Err(TextError::TruncateTooShort { min, got: max });
        }
        Ok(truncate_text(text, max))
    }
}

/// Unicode NFKC, drop chars outside the allow-list, collapse whitespace runs, trim.
///
/// Disallowed chars are dropped before whitespace is collapsed, so a removed
/// symbol between two spaces never leaves a double space. Dropping a char can
/// also bring two composable chars together (jamo, combining marks), so NFKC
/// and the filter are repeated until the text stops changing.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut kept = normalize_allowed(text);
    loop {
        let next = normalize_allowed(&kept);
        if next == kept {
            break;
        }
        kept = next;
    }

    let mut out = String::with_capacity(kept.len());
    let mut pending_space = false;
    for ch in kept.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}

fn normalize_allowed(text: &str) -> String {
    text.nfkc().filter(|c| is_allowed(*c)).collect()
}

/// Word chars, whitespace, and a fixed punctuation set.
fn is_allowed(ch: char) -> bool {
    ch.is_alphanumeric()
        || ch == '_'
        || ch.is_whitespace()
        || matches!(
            ch,
            '@' | '#' | '.' | ',' | '!' | '?' | ';' | ':' | '(' | ')' | '-' | '\'' | '"'
        )
}

fn validate_post(text: &str, max_length: usize) -> ValidationOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ValidationOutcome::from_errors(vec![ERR_EMPTY.to_string()]);
    }

    let mut errors = Vec::new();

    if text.chars().count() > max_length {
        errors.push(format!(
            "Post exceeds maximum length of {max_length} characters"
        ));
    }

    if trimmed.chars().count() < MIN_POST_LENGTH {
        errors.push(ERR_TOO_SHORT.to_string());
    }

    if rules::has_excessive_repetition(text) {
        errors.push(ERR_REPETITION.to_string());
    }

    if rules::is_spam_like(text) {
        errors.push(ERR_SPAM.to_string());
    }

    ValidationOutcome::from_errors(errors)
}

fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let keep = max_length - ELLIPSIS.chars().count();
    let cut: String = text.chars().take(keep).collect();

    let break_at = max_length as f64 * WORD_BREAK_RATIO;
    let last_space = cut
        .chars()
        .enumerate()
        .filter(|(_, c)| *c == ' ')
        .map(|(i, _)| i)
        .last();

    match last_space {
        Some(i) if i as f64 >= break_at => {
            let head: String = cut.chars().take(i).collect();
            format!("{head}{ELLIPSIS}")
        }
        _ => format!("{cut}{ELLIPSIS}"),
    }
}

/// Soft warnings surfaced by `/api/validate`; they never make a post invalid.
pub fn warnings(stats: &PostStatistics) -> Vec<String> {
    let mut out = Vec::new();
    if stats.hashtag_count > HASHTAG_WARNING_COUNT {
        out.push("High number of hashtags detected".to_string());
    }
    if stats.mention_count > MENTION_WARNING_COUNT {
        out.push("High number of mentions detected".to_string());
    }
    out
}
