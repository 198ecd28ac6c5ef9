//! General-purpose lexical polarity model (first signal).
//!
//! Every rated word carries `(polarity, subjectivity)`. An intensifier right before a
//! rated word scales both values; a negator in the three preceding tokens flips and
//! halves the polarity. The text's values are the means over its rated words, or
//! `(0, 0)` when nothing is rated.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

use super::{LexicalSignal, PolarityModel, SignalError};
use crate::constants::{clamp_signed, clamp_unit};

/// Polarity multiplier applied when a negator precedes a rated word.
const NEGATION_SCALAR: f64 = -0.5;
/// How many tokens back a negator still applies.
const NEGATION_WINDOW: usize = 3;

#[derive(Debug, Deserialize)]
struct PolarityLexicon {
    words: HashMap<String, (f64, f64)>,
    #[serde(default)]
    intensifiers: HashMap<String, f64>,
}

static LEXICON: Lazy<Result<PolarityLexicon, String>> = Lazy::new(|| {
    let raw = include_str!("../../lexicon/polarity.json");
    serde_json::from_str::<PolarityLexicon>(raw).map_err(|e| e.to_string())
});

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternPolarity;

impl PatternPolarity {
    pub fn new() -> Self {
        Self
    }
}

impl PolarityModel for PatternPolarity {
    fn polarity(&self, text: &str) -> Result<LexicalSignal, SignalError> {
        let lex = LEXICON
            .as_ref()
            .map_err(|e| SignalError::Lexicon(format!("polarity lexicon: {e}")))?;

        let tokens: Vec<String> = tokenize(text).collect();
        let mut polarity_sum = 0.0;
        let mut subjectivity_sum = 0.0;
        let mut rated = 0usize;

        for (i, tok) in tokens.iter().enumerate() {
            let Some(&(p0, s0)) = lex.words.get(tok.as_str()) else {
                continue;
            };
            let (mut p, mut s) = (p0, s0);

            if let Some(k) = i
                .checked_sub(1)
                .and_then(|j| lex.intensifiers.get(tokens[j].as_str()))
            {
                p *= k;
                s *= k;
            }

            let negated = (1..=NEGATION_WINDOW).any(|k| i >= k && is_negator(&tokens[i - k]));
            if negated {
                p *= NEGATION_SCALAR;
            }

            polarity_sum += clamp_signed(p);
            subjectivity_sum += clamp_unit(s);
            rated += 1;
        }

        if rated == 0 {
            return Ok(LexicalSignal {
                polarity: 0.0,
                subjectivity: 0.0,
            });
        }

        let n = rated as f64;
        Ok(LexicalSignal {
            polarity: clamp_signed(polarity_sum / n),
            subjectivity: clamp_unit(subjectivity_sum / n),
        })
    }
}

/// Lower-cased word tokens; apostrophes stay inside words so "isn't" survives.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    tok.ends_with("n't")
        || matches!(
            tok,
            "not" | "no" | "never" | "cannot" | "without" | "nothing" | "nor" | "neither"
                // cleaned text loses typographic apostrophes ("isn’t" -> "isnt")
                | "isnt" | "wasnt" | "dont" | "doesnt" | "didnt" | "cant" | "wont"
        )
}
