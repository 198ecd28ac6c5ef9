// src/api.rs
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{FromRequest, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::ApiError;
use crate::logging::anon_hash;
use crate::metrics::{ANALYSIS_DURATION_MS, POSTS_INVALID, POSTS_VALIDATED, REMOTE_ANALYSIS_USED};
use crate::remote::{build_remote_analyzer, DynRemoteAnalyzer};
use crate::sentiment::{SentimentRecord, SentimentScorer};
use crate::text::{warnings, CleanedPost, PostStatistics, TextNormalizer};

pub const DEFAULT_PLATFORM: &str = "twitter";

/// Shared, read-only services. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub normalizer: Arc<TextNormalizer>,
    pub scorer: Arc<SentimentScorer>,
    pub remote: DynRemoteAnalyzer,
}

impl AppState {
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let normalizer = TextNormalizer::with_max_length(settings.max_post_length)?;
        let remote = build_remote_analyzer(settings.remote_analyzer);
        Ok(Self {
            settings: Arc::new(settings),
            normalizer: Arc::new(normalizer),
            scorer: Arc::new(SentimentScorer::new()),
            remote,
        })
    }

    /// Swap the remote provider (tests, alternative deployments).
    pub fn with_remote(mut self, remote: DynRemoteAnalyzer) -> Self {
        self.remote = remote;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/info", get(info_route))
        .route("/api/validate", post(validate))
        .route("/api/analyze", post(analyze))
        .route("/api/sentiment", post(sentiment))
        .route("/api/sentiment/batch", post(sentiment_batch))
        .route("/api/statistics/{*text}", get(statistics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// `Json` extractor whose rejections leave as `ApiError` JSON bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub text: String,
    #[serde(default = "default_platform")]
    pub platform: String,
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
    pub code: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
    pub warnings: Vec<String>,
    pub statistics: PostStatistics,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Local,
    Remote,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub post_id: String,
    pub original_text: String,
    pub cleaned_text: String,
    pub platform: String,
    /// Seconds.
    pub analysis_time: f64,
    pub timestamp: String,
    pub sentiment: SentimentRecord,
    pub statistics: PostStatistics,
    pub source: AnalysisSource,
    pub summary: String,
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": format!("Welcome to {}", state.settings.app_name),
        "version": state.settings.app_version,
        "status": "running",
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": state.settings.app_version,
        "environment": state.settings.environment,
    }))
}

async fn info_route(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": state.settings.app_name,
        "version": state.settings.app_version,
        "environment": state.settings.environment,
        "remote_provider": state.remote.provider_name(),
        "max_post_length": state.normalizer.max_length(),
    }))
}

/// Clean + validate, recording the outcome in metrics.
fn check_post(state: &AppState, text: &str) -> CleanedPost {
    let post = state.normalizer.clean_and_validate(text);
    counter!(POSTS_VALIDATED).increment(1);
    if !post.outcome.is_valid {
        counter!(POSTS_INVALID).increment(1);
    }
    post
}

async fn validate(
    State(state): State<AppState>,
    AppJson(body): AppJson<PostRequest>,
) -> Json<ValidateResponse> {
    let post = check_post(&state, &body.text);
    let statistics = state.normalizer.statistics(&body.text);

    debug!(
        id = %anon_hash(&body.text),
        platform = %body.platform,
        valid = post.outcome.is_valid,
        "post validated"
    );

    let errors = post
        .outcome
        .errors
        .into_iter()
        .map(|message| FieldError {
            field: "text",
            message,
            code: "VALIDATION_ERROR",
        })
        .collect();

    Json(ValidateResponse {
        is_valid: post.outcome.is_valid,
        errors,
        warnings: warnings(&statistics),
        statistics,
    })
}

async fn analyze(
    State(state): State<AppState>,
    AppJson(body): AppJson<PostRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let started = Instant::now();
    let now = Utc::now();
    let post_id = anon_hash(&format!(
        "{}{}",
        body.text,
        now.timestamp_nanos_opt().unwrap_or_default()
    ));

    info!(
        post_id = %post_id,
        text_len = body.text.chars().count(),
        platform = %body.platform,
        "analysis started"
    );

    let post = check_post(&state, &body.text);
    if !post.outcome.is_valid {
        info!(post_id = %post_id, errors = post.outcome.errors.len(), "post rejected");
        return Err(ApiError::InvalidPost(post.outcome.errors));
    }

    let statistics = state.normalizer.statistics(&body.text);

    let (sentiment, summary, source) =
        match state.remote.analyze(&post.cleaned_text, &body.platform).await {
            Some(remote) => {
                counter!(REMOTE_ANALYSIS_USED).increment(1);
                (remote.sentiment, remote.summary, AnalysisSource::Remote)
            }
            None => {
                let record = state.scorer.analyze(&post.cleaned_text);
                let summary = local_summary(&record);
                (record, summary, AnalysisSource::Local)
            }
        };

    let elapsed = started.elapsed();
    histogram!(ANALYSIS_DURATION_MS).record(elapsed.as_secs_f64() * 1000.0);
    info!(
        post_id = %post_id,
        elapsed_ms = elapsed.as_millis() as u64,
        source = ?source,
        sentiment = sentiment.sentiment.as_str(),
        "analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        post_id,
        original_text: body.text,
        cleaned_text: post.cleaned_text,
        platform: body.platform,
        analysis_time: elapsed.as_secs_f64(),
        timestamp: now.to_rfc3339(),
        sentiment,
        statistics,
        source,
        summary,
    }))
}

fn local_summary(record: &SentimentRecord) -> String {
    format!(
        "Local analysis completed: {} tone ({:.0}% confidence).",
        record.sentiment.as_str(),
        record.confidence * 100.0
    )
}

async fn sentiment(
    State(state): State<AppState>,
    AppJson(body): AppJson<SentimentRequest>,
) -> Json<SentimentRecord> {
    let cleaned = state.normalizer.clean(&body.text);
    Json(state.scorer.analyze(&cleaned))
}

async fn sentiment_batch(
    State(state): State<AppState>,
    AppJson(body): AppJson<BatchRequest>,
) -> Json<Vec<SentimentRecord>> {
    let cleaned: Vec<String> = body
        .texts
        .iter()
        .map(|t| state.normalizer.clean(t))
        .collect();
    debug!(items = cleaned.len(), "sentiment batch");
    Json(state.scorer.analyze_batch(&cleaned))
}

async fn statistics(
    State(state): State<AppState>,
    Path(text): Path<String>,
) -> Json<PostStatistics> {
    Json(state.normalizer.statistics(&text))
}
