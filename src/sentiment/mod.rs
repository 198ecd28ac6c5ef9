// src/sentiment/mod.rs
//! Two-signal sentiment scoring.
//!
//! Order:
//! 1) lexical polarity + subjectivity (`PolarityModel`, default `PatternPolarity`)
//! 2) valence compound + pos/neg/neu (`ValenceModel`, default `ValenceAnalyzer`)
//! 3) blend `0.3 * polarity + 0.7 * compound`, clamp to [-1, 1]
//! 4) classify with the ±0.1 thresholds and derive a confidence
//! 5) canned explanation plus subjectivity/intensity clauses
//!
//! The scorer analyzes exactly the text it is handed; the HTTP layer passes the
//! cleaned text. Any signal failure degrades to `SentimentRecord::fallback()`.

pub mod lexical;
pub mod valence;

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::constants::{
    clamp_signed, clamp_unit, HIGH_SUBJECTIVITY, LEXICAL_WEIGHT, LOW_SUBJECTIVITY,
    NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD, STRONG_INTENSITY, SUBTLE_INTENSITY, VALENCE_WEIGHT,
};

pub use lexical::PatternPolarity;
pub use valence::ValenceAnalyzer;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("lexicon unavailable: {0}")]
    Lexicon(String),
    #[error("{signal} produced a non-finite value")]
    NonFinite { signal: &'static str },
    #[error("{signal} value {value} is outside its range")]
    OutOfRange { signal: &'static str, value: f64 },
}

/// First signal: polarity in [-1, 1], subjectivity in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LexicalSignal {
    pub polarity: f64,
    pub subjectivity: f64,
}

/// Second signal: compound in [-1, 1] plus the pos/neg/neu fractions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValenceSignal {
    pub compound: f64,
    pub pos: f64,
    pub neg: f64,
    pub neu: f64,
}

pub trait PolarityModel: Send + Sync {
    fn polarity(&self, text: &str) -> Result<LexicalSignal, SignalError>;
}

pub trait ValenceModel: Send + Sync {
    fn polarity_scores(&self, text: &str) -> Result<ValenceSignal, SignalError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    fn base_explanation(&self) -> &'static str {
        match self {
            Sentiment::Positive => {
                "The post has a positive tone that could engage your audience well."
            }
            Sentiment::Negative => "The post may come across as negative or critical.",
            Sentiment::Neutral => "The post has a balanced, neutral tone.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentDetails {
    pub lexical: LexicalSignal,
    pub valence: ValenceSignal,
    pub combined: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub score: f64,
    pub explanation: String,
    pub details: SentimentDetails,
}

impl SentimentRecord {
    /// Returned whenever a signal fails; never an error for the caller.
    pub fn fallback() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            confidence: 0.5,
            score: 0.0,
            explanation: "Sentiment analysis was unable to process this text.".to_string(),
            details: SentimentDetails {
                lexical: LexicalSignal {
                    polarity: 0.0,
                    subjectivity: 0.5,
                },
                valence: ValenceSignal {
                    compound: 0.0,
                    pos: 0.0,
                    neg: 0.0,
                    neu: 1.0,
                },
                combined: 0.0,
            },
        }
    }
}

/// Stateless scorer; models are shared read-only, so one instance serves every request.
#[derive(Clone)]
pub struct SentimentScorer {
    lexical: Arc<dyn PolarityModel>,
    valence: Arc<dyn ValenceModel>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SentimentScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentScorer").finish_non_exhaustive()
    }
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self::with_models(Arc::new(PatternPolarity::new()), Arc::new(ValenceAnalyzer::new()))
    }

    pub fn with_models(lexical: Arc<dyn PolarityModel>, valence: Arc<dyn ValenceModel>) -> Self {
        Self { lexical, valence }
    }

    /// Never fails: signal errors are logged and replaced by the fallback record.
    pub fn analyze(&self, text: &str) -> SentimentRecord {
        match self.try_analyze(text) {
            Ok(rec) => rec,
            Err(e) => {
                warn!(error = %e, text_len = text.chars().count(), "sentiment analysis fell back");
                counter!(crate::metrics::SENTIMENT_FALLBACK).increment(1);
                SentimentRecord::fallback()
            }
        }
    }

    /// Explicit result path: the record, or the reason a signal could not be used.
    pub fn try_analyze(&self, text: &str) -> Result<SentimentRecord, SignalError> {
        let lexical = checked_lexical(self.lexical.polarity(text)?)?;
        let valence = checked_valence(self.valence.polarity_scores(text)?)?;

        let combined = combine(lexical.polarity, valence.compound);
        let (sentiment, confidence) = classify(combined);
        let explanation = explain(sentiment, combined, lexical.subjectivity);

        Ok(SentimentRecord {
            sentiment,
            confidence,
            score: combined,
            explanation,
            details: SentimentDetails {
                lexical,
                valence,
                combined,
            },
        })
    }

    /// Each text independently, same order.
    pub fn analyze_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SentimentRecord> {
        texts.iter().map(|t| self.analyze(t.as_ref())).collect()
    }
}

/// Weighted blend of the two signals, clamped to [-1, 1].
pub fn combine(polarity: f64, compound: f64) -> f64 {
    clamp_signed(LEXICAL_WEIGHT * polarity + VALENCE_WEIGHT * compound)
}

/// Category plus confidence in [0, 1].
pub fn classify(score: f64) -> (Sentiment, f64) {
    if score > POSITIVE_THRESHOLD {
        let c = (score - POSITIVE_THRESHOLD) / (1.0 - POSITIVE_THRESHOLD);
        (Sentiment::Positive, clamp_unit(c.min(1.0)))
    } else if score < NEGATIVE_THRESHOLD {
        let c = (NEGATIVE_THRESHOLD - score) / (NEGATIVE_THRESHOLD + 1.0);
        (Sentiment::Negative, clamp_unit(c.min(1.0)))
    } else {
        (Sentiment::Neutral, clamp_unit(1.0 - score.abs()))
    }
}

pub fn explain(sentiment: Sentiment, score: f64, subjectivity: f64) -> String {
    let mut out = sentiment.base_explanation().to_string();

    if subjectivity > HIGH_SUBJECTIVITY {
        out.push_str(" The content is quite subjective and personal.");
    } else if subjectivity < LOW_SUBJECTIVITY {
        out.push_str(" The content is objective and factual.");
    }

    let intensity = score.abs();
    if intensity > STRONG_INTENSITY {
        out.push_str(" The sentiment is strongly expressed.");
    } else if intensity < SUBTLE_INTENSITY {
        out.push_str(" The sentiment is subtle and understated.");
    }

    out
}

fn checked_lexical(s: LexicalSignal) -> Result<LexicalSignal, SignalError> {
    const SIGNAL: &str = "lexical";
    finite(SIGNAL, s.polarity)?;
    finite(SIGNAL, s.subjectivity)?;
    in_range(SIGNAL, s.polarity, -1.0, 1.0)?;
    in_range(SIGNAL, s.subjectivity, 0.0, 1.0)?;
    Ok(s)
}

fn checked_valence(s: ValenceSignal) -> Result<ValenceSignal, SignalError> {
    const SIGNAL: &str = "valence";
    for v in [s.compound, s.pos, s.neg, s.neu] {
        finite(SIGNAL, v)?;
    }
    in_range(SIGNAL, s.compound, -1.0, 1.0)?;
    for v in [s.pos, s.neg, s.neu] {
        in_range(SIGNAL, v, 0.0, 1.0)?;
    }
    Ok(s)
}

fn finite(signal: &'static str, v: f64) -> Result<(), SignalError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SignalError::NonFinite { signal })
    }
}

fn in_range(signal: &'static str, value: f64, lo: f64, hi: f64) -> Result<(), SignalError> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(SignalError::OutOfRange { signal, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64, f64);
    impl PolarityModel for Fixed {
        fn polarity(&self, _: &str) -> Result<LexicalSignal, SignalError> {
            Ok(LexicalSignal {
                polarity: self.0,
                subjectivity: self.1,
            })
        }
    }

    struct Broken;
    impl ValenceModel for Broken {
        fn polarity_scores(&self, _: &str) -> Result<ValenceSignal, SignalError> {
            Err(SignalError::Lexicon("missing".into()))
        }
    }

    struct NaNValence;
    impl ValenceModel for NaNValence {
        fn polarity_scores(&self, _: &str) -> Result<ValenceSignal, SignalError> {
            Ok(ValenceSignal {
                compound: f64::NAN,
                ..ValenceSignal::default()
            })
        }
    }

    #[test]
    fn classify_thresholds_are_exclusive() {
        assert_eq!(classify(0.1).0, Sentiment::Neutral);
        assert_eq!(classify(-0.1).0, Sentiment::Neutral);
        assert_eq!(classify(0.1000001).0, Sentiment::Positive);
        assert_eq!(classify(-0.1000001).0, Sentiment::Negative);
    }

    #[test]
    fn confidence_formulas() {
        let (s, c) = classify(1.0);
        assert_eq!(s, Sentiment::Positive);
        assert!((c - 1.0).abs() < 1e-12);

        let (s, c) = classify(-0.55);
        assert_eq!(s, Sentiment::Negative);
        assert!((c - 0.5).abs() < 1e-12);

        let (s, c) = classify(0.05);
        assert_eq!(s, Sentiment::Neutral);
        assert!((c - 0.95).abs() < 1e-12);
    }

    #[test]
    fn combine_weights_and_clamps() {
        assert!((combine(1.0, 0.0) - 0.3).abs() < 1e-12);
        assert!((combine(0.0, 1.0) - 0.7).abs() < 1e-12);
        assert!((combine(-0.5, 0.5) - 0.2).abs() < 1e-12);
        assert_eq!(combine(3.0, 3.0), 1.0);
        assert_eq!(combine(-3.0, -3.0), -1.0);
    }

    #[test]
    fn explanation_clauses_are_independent() {
        let e = explain(Sentiment::Positive, 0.8, 0.9);
        assert!(e.starts_with("The post has a positive tone"));
        assert!(e.contains("quite subjective"));
        assert!(e.contains("strongly expressed"));

        let e = explain(Sentiment::Neutral, 0.0, 0.0);
        assert!(e.contains("objective and factual"));
        assert!(e.contains("subtle and understated"));

        // middle bands add nothing
        assert_eq!(
            explain(Sentiment::Negative, -0.5, 0.5),
            "The post may come across as negative or critical."
        );
    }

    #[test]
    fn positive_post() {
        let r = SentimentScorer::new().analyze("I love this amazing product! It's fantastic!");
        assert_eq!(r.sentiment, Sentiment::Positive);
        assert!(r.confidence > 0.5, "{r:?}");
        assert_eq!(r.score, r.details.combined);
    }

    #[test]
    fn negative_post() {
        let r = SentimentScorer::new().analyze("This is terrible and I hate it.");
        assert_eq!(r.sentiment, Sentiment::Negative);
        assert!(r.confidence > 0.5, "{r:?}");
    }

    #[test]
    fn neutral_post() {
        let r = SentimentScorer::new().analyze("The weather is cloudy today.");
        assert_eq!(r.sentiment, Sentiment::Neutral);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn failing_signal_falls_back() {
        let scorer = SentimentScorer::with_models(Arc::new(Fixed(0.9, 0.9)), Arc::new(Broken));
        assert!(scorer.try_analyze("great").is_err());
        let r = scorer.analyze("great");
        assert_eq!(r, SentimentRecord::fallback());
        assert_eq!(r.sentiment, Sentiment::Neutral);
        assert_eq!(r.confidence, 0.5);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn non_finite_or_out_of_range_signal_falls_back() {
        let scorer = SentimentScorer::with_models(Arc::new(Fixed(0.0, 0.0)), Arc::new(NaNValence));
        assert!(matches!(
            scorer.try_analyze("x"),
            Err(SignalError::NonFinite { signal: "valence" })
        ));

        let scorer =
            SentimentScorer::with_models(Arc::new(Fixed(1.5, 0.2)), Arc::new(ValenceAnalyzer::new()));
        assert!(matches!(
            scorer.try_analyze("x"),
            Err(SignalError::OutOfRange { signal: "lexical", .. })
        ));
        assert_eq!(scorer.analyze("x"), SentimentRecord::fallback());
    }

    #[test]
    fn batch_matches_single_calls() {
        let scorer = SentimentScorer::new();
        let texts = ["I love it", "I hate it", ""];
        let batch = scorer.analyze_batch(&texts);
        let single: Vec<_> = texts.iter().map(|t| scorer.analyze(t)).collect();
        assert_eq!(batch, single);
        assert!(scorer.analyze_batch::<&str>(&[]).is_empty());
    }

    #[test]
    fn serializes_lowercase_sentiment() {
        let json = serde_json::to_value(SentimentRecord::fallback()).unwrap();
        assert_eq!(json["sentiment"], "neutral");
        assert_eq!(json["details"]["valence"]["neu"], 1.0);
        assert_eq!(json["details"]["lexical"]["subjectivity"], 0.5);
    }
}
