//! Lexicon-and-rule valence model tuned for short social media text (second signal).
//!
//! Per-token valences from `lexicon/valence.json` are adjusted by:
//! - booster words up to three tokens back (damped with distance),
//! - negators up to three tokens back (`N_SCALAR`),
//! - ALL-CAPS emphasis, only when the text mixes caps and non-caps words,
//! - a "but" contrast (earlier clause halved, later clause boosted),
//! - `!` and `?` emphasis on the summed score.
//!
//! The sum is squashed into [-1, 1] as the compound score; the pos/neg/neu
//! fractions come from the same per-token valences.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use super::{SignalError, ValenceModel, ValenceSignal};
use crate::constants::{clamp_signed, round_to};

const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
const C_INCR: f64 = 0.733;
const N_SCALAR: f64 = -0.74;
/// Normalization constant for `s / sqrt(s^2 + ALPHA)`.
const ALPHA: f64 = 15.0;

const EXCLAIM_STEP: f64 = 0.292;
const MAX_EXCLAIMS: usize = 4;
const QUESTION_STEP: f64 = 0.18;
const QUESTION_CAP: f64 = 0.96;

#[derive(Debug, Deserialize)]
struct ValenceLexicon {
    words: HashMap<String, f64>,
    #[serde(default)]
    boosters_up: HashSet<String>,
    #[serde(default)]
    boosters_down: HashSet<String>,
    #[serde(default)]
    negations: HashSet<String>,
}

static LEXICON: Lazy<Result<ValenceLexicon, String>> = Lazy::new(|| {
    let raw = include_str!("../../lexicon/valence.json");
    serde_json::from_str::<ValenceLexicon>(raw).map_err(|e| e.to_string())
});

#[derive(Debug, Clone, Copy, Default)]
pub struct ValenceAnalyzer;

impl ValenceAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl ValenceModel for ValenceAnalyzer {
    fn polarity_scores(&self, text: &str) -> Result<ValenceSignal, SignalError> {
        let lex = LEXICON
            .as_ref()
            .map_err(|e| SignalError::Lexicon(format!("valence lexicon: {e}")))?;
        Ok(Scan::new(lex, text).run())
    }
}

/// One pass over a single text.
struct Scan<'a> {
    lex: &'a ValenceLexicon,
    text: &'a str,
    tokens: Vec<&'a str>,
    lower: Vec<String>,
    cap_diff: bool,
}

impl<'a> Scan<'a> {
    fn new(lex: &'a ValenceLexicon, text: &'a str) -> Self {
        let tokens: Vec<&str> = text.split_whitespace().map(strip_punct_if_word).collect();
        let lower = tokens.iter().map(|t| t.to_lowercase()).collect();
        let caps = tokens.iter().filter(|t| is_upper(t)).count();
        Self {
            lex,
            text,
            cap_diff: caps > 0 && caps < tokens.len(),
            tokens,
            lower,
        }
    }

    fn run(&self) -> ValenceSignal {
        let mut sentiments: Vec<f64> = (0..self.tokens.len()).map(|i| self.valence_at(i)).collect();
        self.but_check(&mut sentiments);
        self.score(&sentiments)
    }

    fn in_lexicon(&self, w: &str) -> bool {
        self.lex.words.contains_key(w)
    }

    fn is_booster(&self, w: &str) -> bool {
        self.lex.boosters_up.contains(w) || self.lex.boosters_down.contains(w)
    }

    fn negated(&self, w: &str) -> bool {
        self.lex.negations.contains(w) || w.contains("n't")
    }

    fn valence_at(&self, i: usize) -> f64 {
        let lw = self.lower[i].as_str();
        let next = self.lower.get(i + 1).map(String::as_str);

        if self.is_booster(lw) {
            return 0.0;
        }
        if lw == "kind" && next == Some("of") {
            return 0.0;
        }
        let Some(&base) = self.lex.words.get(lw) else {
            return 0.0;
        };
        // "no" right before a rated word acts as a negator, not as a word of its own
        if lw == "no" && next.is_some_and(|n| self.in_lexicon(n)) {
            return 0.0;
        }

        let mut valence = base;
        let prev_no = (1..=2).any(|k| i >= k && self.lower[i - k] == "no");
        if prev_no {
            valence = base * N_SCALAR;
        }

        if self.cap_diff && is_upper(self.tokens[i]) {
            valence += if valence > 0.0 { C_INCR } else { -C_INCR };
        }

        for start in 0..3 {
            if i <= start {
                break;
            }
            let j = i - (start + 1);
            if self.in_lexicon(&self.lower[j]) {
                continue;
            }
            let mut s = self.scalar_inc_dec(j, valence);
            if start == 1 {
                s *= 0.95;
            } else if start == 2 {
                s *= 0.9;
            }
            valence += s;
            valence = self.negation_check(valence, start, i);
        }

        self.least_check(valence, i)
    }

    /// Booster contribution of token `j` given the current valence sign.
    fn scalar_inc_dec(&self, j: usize, valence: f64) -> f64 {
        let lw = self.lower[j].as_str();
        let mut scalar = if self.lex.boosters_up.contains(lw) {
            B_INCR
        } else if self.lex.boosters_down.contains(lw) {
            B_DECR
        } else {
            return 0.0;
        };
        if valence < 0.0 {
            scalar = -scalar;
        }
        if self.cap_diff && is_upper(self.tokens[j]) {
            scalar += if valence > 0.0 { C_INCR } else { -C_INCR };
        }
        scalar
    }

    fn negation_check(&self, valence: f64, start: usize, i: usize) -> f64 {
        let w = |k: usize| self.lower[i - k].as_str();
        let so_this = |s: &str| s == "so" || s == "this";
        match start {
            0 if self.negated(w(1)) => valence * N_SCALAR,
            1 if w(2) == "never" && so_this(w(1)) => valence * 1.25,
            1 if w(2) == "without" && w(1) == "doubt" => valence,
            1 if self.negated(w(2)) => valence * N_SCALAR,
            2 if w(3) == "never" && (so_this(w(2)) || so_this(w(1))) => valence * 1.25,
            2 if w(3) == "without" && (w(2) == "doubt" || w(1) == "doubt") => valence,
            2 if self.negated(w(3)) => valence * N_SCALAR,
            _ => valence,
        }
    }

    /// "least good" negates, "at least good" / "very least" do not.
    fn least_check(&self, valence: f64, i: usize) -> f64 {
        if i == 0 {
            return valence;
        }
        let prev = self.lower[i - 1].as_str();
        if prev != "least" || self.in_lexicon(prev) {
            return valence;
        }
        if i > 1 && matches!(self.lower[i - 2].as_str(), "at" | "very") {
            return valence;
        }
        valence * N_SCALAR
    }

    fn but_check(&self, sentiments: &mut [f64]) {
        let Some(bi) = self.lower.iter().position(|w| w == "but") else {
            return;
        };
        for (si, s) in sentiments.iter_mut().enumerate() {
            if si < bi {
                *s *= 0.5;
            } else if si > bi {
                *s *= 1.5;
            }
        }
    }

    fn punctuation_emphasis(&self) -> f64 {
        let ep = self.text.matches('!').count().min(MAX_EXCLAIMS) as f64 * EXCLAIM_STEP;
        let qm_count = self.text.matches('?').count();
        let qm = match qm_count {
            0 | 1 => 0.0,
            2..=3 => qm_count as f64 * QUESTION_STEP,
            _ => QUESTION_CAP,
        };
        ep + qm
    }

    fn score(&self, sentiments: &[f64]) -> ValenceSignal {
        if sentiments.is_empty() {
            return ValenceSignal::default();
        }

        let punct = self.punctuation_emphasis();
        let mut sum: f64 = sentiments.iter().sum();
        if sum > 0.0 {
            sum += punct;
        } else if sum < 0.0 {
            sum -= punct;
        }
        let compound = normalize(sum);

        let mut pos_sum = 0.0;
        let mut neg_sum = 0.0;
        let mut neu_count = 0.0;
        for &s in sentiments {
            if s > 0.0 {
                pos_sum += s + 1.0;
            } else if s < 0.0 {
                neg_sum += s - 1.0;
            } else {
                neu_count += 1.0;
            }
        }
        if pos_sum > neg_sum.abs() {
            pos_sum += punct;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= punct;
        }

        let total = pos_sum + neg_sum.abs() + neu_count;
        ValenceSignal {
            compound: round_to(compound, 4),
            pos: round_to((pos_sum / total).abs(), 3),
            neg: round_to((neg_sum / total).abs(), 3),
            neu: round_to((neu_count / total).abs(), 3),
        }
    }
}

fn normalize(score: f64) -> f64 {
    clamp_signed(score / (score * score + ALPHA).sqrt())
}

/// Strip surrounding ASCII punctuation unless that would leave two chars or fewer,
/// which keeps emoticons like `:)` intact.
fn strip_punct_if_word(token: &str) -> &str {
    let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
    if stripped.chars().count() <= 2 {
        token
    } else {
        stripped
    }
}

/// At least one cased char and no lowercase ones.
fn is_upper(w: &str) -> bool {
    w.chars().any(char::is_uppercase) && !w.chars().any(char::is_lowercase)
}
