//! Content-policy heuristics used by `TextNormalizer::validate`.
//!
//! Each check is a pure predicate over the text passed in; the caller decides
//! which error string to attach.

use crate::constants::{
    REPEATED_CHAR_RUN, REPEATED_WORD_RUN, SPAM_MAX_HASHTAGS, SPAM_PUNCTUATION_RATIO,
    SPAM_UPPERCASE_RATIO,
};
use crate::text::extract::hashtag_occurrences;

/// True if any char (newlines excluded) repeats `REPEATED_CHAR_RUN`+ times in a row,
/// or the same whitespace-separated word appears `REPEATED_WORD_RUN` times in a row.
pub fn has_excessive_repetition(text: &str) -> bool {
    has_char_run(text, REPEATED_CHAR_RUN) || has_word_run(text, REPEATED_WORD_RUN)
}

fn has_char_run(text: &str, run: usize) -> bool {
    let mut prev: Option<char> = None;
    let mut len = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            prev = None;
            len = 0;
            continue;
        }
        if Some(ch) == prev {
            len += 1;
        } else {
            prev = Some(ch);
            len = 1;
        }
        if len >= run {
            return true;
        }
    }
    false
}

fn has_word_run(text: &str, run: usize) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .windows(run)
        .any(|w| w.iter().all(|x| *x == w[0]))
}

/// Spam-like if ASCII capitals exceed 70% of the length, `!`/`?` exceed 10% of it,
/// or there are more than 10 `#tag` occurrences.
pub fn is_spam_like(text: &str) -> bool {
    let len = text.chars().count() as f64;

    let upper = text.chars().filter(|c| c.is_ascii_uppercase()).count() as f64;
    if upper > len * SPAM_UPPERCASE_RATIO {
        return true;
    }

    let marks = text.chars().filter(|c| matches!(c, '!' | '?')).count() as f64;
    if marks > len * SPAM_PUNCTUATION_RATIO {
        return true;
    }

    hashtag_occurrences(text) > SPAM_MAX_HASHTAGS
}
