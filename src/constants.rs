//! Shared limits, thresholds and numeric helpers used by the text and sentiment modules.
//!
//! Lengths are counted in chars (Unicode scalar values), never bytes.

// --- post limits ---
pub const DEFAULT_MAX_POST_LENGTH: usize = 280;
pub const MIN_POST_LENGTH: usize = 3;

// --- validation heuristics ---
/// A single char repeated this many times in a row counts as excessive repetition.
pub const REPEATED_CHAR_RUN: usize = 4;
/// The same whole word this many times in a row counts as excessive repetition.
pub const REPEATED_WORD_RUN: usize = 3;
pub const SPAM_UPPERCASE_RATIO: f64 = 0.7;
pub const SPAM_PUNCTUATION_RATIO: f64 = 0.1;
pub const SPAM_MAX_HASHTAGS: usize = 10;

// --- /validate warnings ---
pub const HASHTAG_WARNING_COUNT: usize = 5;
pub const MENTION_WARNING_COUNT: usize = 3;

// --- truncation ---
pub const ELLIPSIS: &str = "...";
/// Word break is only taken when the last space sits at or past this share of the limit.
pub const WORD_BREAK_RATIO: f64 = 0.8;

// --- sentiment blending ---
pub const LEXICAL_WEIGHT: f64 = 0.3;
pub const VALENCE_WEIGHT: f64 = 0.7;
pub const POSITIVE_THRESHOLD: f64 = 0.1;
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

// --- explanation clauses ---
pub const HIGH_SUBJECTIVITY: f64 = 0.7;
pub const LOW_SUBJECTIVITY: f64 = 0.3;
pub const STRONG_INTENSITY: f64 = 0.7;
pub const SUBTLE_INTENSITY: f64 = 0.2;

/// Clamp into the signed unit interval [-1, 1].
#[inline]
pub fn clamp_signed(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

/// Clamp into the unit interval [0, 1].
#[inline]
pub fn clamp_unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Round half away from zero to `places` decimals.
pub fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}
