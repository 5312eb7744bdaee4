use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, header},
};
use quality_analytics::{
    application::{
        analytics::orchestrator::AnalyticsOrchestrator, impact_scoring::scorer::ImpactScorer,
        trend_analysis::analyzer::TrendAnalyzer,
    },
    config::Config,
    infrastructure::{
        alerts::dispatcher::AlertDispatcher, queue::sample_queue::SampleQueue,
        store::metric_store::MetricStore,
    },
    presentation::http::{routes::create_router, state::AppState},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub engine: Arc<AnalyticsOrchestrator>,
    pub queue: Arc<SampleQueue>,
}

fn build_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        sample_queue_capacity: 100,
        ..Config::default()
    }
}

/// Engine wired like the binary, with the periodic loops left stopped so tests
/// drive cycles explicitly.
pub fn spawn_app() -> TestApp {
    let config = build_config();
    let queue = Arc::new(SampleQueue::new(config.sample_queue_capacity));
    let engine = Arc::new(AnalyticsOrchestrator::new(
        Arc::new(MetricStore::with_config(config.store())),
        Arc::new(TrendAnalyzer::new(config.analyzer())),
        Arc::new(ImpactScorer::new(config.impact()).expect("default impact config is valid")),
        Arc::new(AlertDispatcher::new()),
        queue.clone(),
        config.orchestrator(),
    ));

    let state = AppState {
        engine: engine.clone(),
        queue: queue.clone(),
        config,
    };

    TestApp {
        app: create_router(state),
        engine,
        queue,
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.expect("request failed")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub async fn read_json<T: DeserializeOwned>(res: axum::response::Response) -> T {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("failed to parse json")
}

pub async fn read_text(res: axum::response::Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("invalid utf8")
}

pub async fn expect_status(
    res: axum::response::Response,
    expected: http::StatusCode,
) -> axum::response::Response {
    let actual = res.status();
    if actual == expected {
        return res;
    }

    let body = read_text(res).await;
    panic!(
        "HTTP status mismatch. Expected {}, got {}. Response body: {}",
        expected, actual, body
    );
}
