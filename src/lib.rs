// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod remote;
pub mod sentiment;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::Settings;
pub use crate::sentiment::{Sentiment, SentimentRecord, SentimentScorer};
pub use crate::text::{PostStatistics, TextNormalizer, ValidationOutcome};
