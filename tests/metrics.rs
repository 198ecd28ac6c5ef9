// tests/metrics.rs
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use civic_post_review::{
    api,
    config::Settings,
    metrics::Metrics,
    remote::MockAnalyzer,
    sentiment::{LexicalSignal, PolarityModel, SentimentScorer, SignalError, ValenceAnalyzer},
};

/// Signal A stand-in that always fails, forcing the fallback record.
struct BrokenLexicon;

impl PolarityModel for BrokenLexicon {
    fn polarity(&self, _text: &str) -> Result<LexicalSignal, SignalError> {
        Err(SignalError::Lexicon("unavailable in test".into()))
    }
}

fn state() -> api::AppState {
    api::AppState::from_settings(Settings::default()).expect("state")
}

// Full in-process app with the Prometheus route merged, as main.rs does.
fn build_app(state: api::AppState) -> Router {
    let metrics = Metrics::init().expect("install recorder");
    api::router(state).merge(metrics.router())
}

fn analyze_req(text: &str) -> Request<Body> {
    Request::post("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "text": text }).to_string()))
        .unwrap()
}

async fn scrape(app: Router) -> String {
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let app = build_app(state());

    let resp = app
        .clone()
        .oneshot(analyze_req("Proud of our volunteers today"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().oneshot(analyze_req("")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let text = scrape(app).await;
    for needle in [
        "posts_validated_total",
        "posts_invalid_total",
        "post_analysis_duration_ms",
    ] {
        assert!(text.contains(needle), "missing series {needle} in:\n{text}");
    }
}

#[tokio::test]
async fn remote_and_fallback_paths_are_counted() {
    let remote_app = build_app(state().with_remote(Arc::new(MockAnalyzer::default())));
    let resp = remote_app
        .clone()
        .oneshot(analyze_req("Library hours extended this summer"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let mut broken = state();
    broken.scorer = Arc::new(SentimentScorer::with_models(
        Arc::new(BrokenLexicon),
        Arc::new(ValenceAnalyzer::new()),
    ));
    let broken_app = build_app(broken);
    let resp = broken_app
        .oneshot(analyze_req("Library hours extended this summer"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let text = scrape(remote_app).await;
    for needle in ["remote_analysis_used_total", "sentiment_fallback_total"] {
        assert!(text.contains(needle), "missing series {needle} in:\n{text}");
    }
}

#[test]
fn init_is_idempotent() {
    let a = Metrics::init().expect("first");
    let b = Metrics::init().expect("second");
    assert_eq!(a.handle.render().is_empty(), b.handle.render().is_empty());
}
