//! Remote analyzer seam: the LLM-backed reviewer lives outside this crate.
//!
//! Handlers only see `DynRemoteAnalyzer`. `None` from `analyze` means the remote
//! side is unavailable, and the caller falls back to the local `SentimentRecord`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::sentiment::{
    LexicalSignal, Sentiment, SentimentDetails, SentimentRecord, ValenceSignal,
};

pub const ENV_REMOTE_MODE: &str = "REMOTE_ANALYZER_MODE";

/// Result returned by a remote provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteAnalysis {
    pub sentiment: SentimentRecord,
    pub summary: String,
}

#[async_trait]
pub trait RemoteAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str, platform: &str) -> Option<RemoteAnalysis>;
    /// Provider name for diagnostics (`/api/info`, logs).
    fn provider_name(&self) -> &'static str;
}

pub type DynRemoteAnalyzer = Arc<dyn RemoteAnalyzer>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteMode {
    #[default]
    Disabled,
    Mock,
}

impl FromStr for RemoteMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "disabled" | "off" | "none" => Ok(RemoteMode::Disabled),
            "mock" => Ok(RemoteMode::Mock),
            other => anyhow::bail!("unsupported remote analyzer mode: {other}"),
        }
    }
}

/// Always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAnalyzer;

#[async_trait]
impl RemoteAnalyzer for DisabledAnalyzer {
    async fn analyze(&self, _text: &str, _platform: &str) -> Option<RemoteAnalysis> {
        None
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic provider for tests and local demos.
#[derive(Debug, Clone)]
pub struct MockAnalyzer {
    fixed: RemoteAnalysis,
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self {
            fixed: RemoteAnalysis {
                sentiment: SentimentRecord {
                    sentiment: Sentiment::Neutral,
                    confidence: 0.9,
                    score: 0.0,
                    explanation: "Neutral tone (mock).".to_string(),
                    details: SentimentDetails {
                        lexical: LexicalSignal::default(),
                        valence: ValenceSignal {
                            neu: 1.0,
                            ..ValenceSignal::default()
                        },
                        combined: 0.0,
                    },
                },
                summary: "Mock remote review completed.".to_string(),
            },
        }
    }
}

#[async_trait]
impl RemoteAnalyzer for MockAnalyzer {
    async fn analyze(&self, _text: &str, _platform: &str) -> Option<RemoteAnalysis> {
        Some(self.fixed.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

pub fn build_remote_analyzer(mode: RemoteMode) -> DynRemoteAnalyzer {
    match mode {
        RemoteMode::Disabled => Arc::new(DisabledAnalyzer),
        RemoteMode::Mock => Arc::new(MockAnalyzer::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parsing() {
        assert_eq!("".parse::<RemoteMode>().unwrap(), RemoteMode::Disabled);
        assert_eq!(" Mock ".parse::<RemoteMode>().unwrap(), RemoteMode::Mock);
        assert_eq!("OFF".parse::<RemoteMode>().unwrap(), RemoteMode::Disabled);
        assert!("openai".parse::<RemoteMode>().is_err());
    }

    #[tokio::test]
    async fn disabled_is_unavailable() {
        let client = build_remote_analyzer(RemoteMode::Disabled);
        assert_eq!(client.provider_name(), "disabled");
        assert!(client.analyze("anything", "twitter").await.is_none());
    }

    #[tokio::test]
    async fn mock_returns_fixed_result() {
        let client = build_remote_analyzer(RemoteMode::Mock);
        assert_eq!(client.provider_name(), "mock");
        let out = client.analyze("anything", "linkedin").await.expect("mock answers");
        assert_eq!(out.sentiment.sentiment, Sentiment::Neutral);
        assert!(out.summary.to_lowercase().contains("mock"));
    }
}
