use crate::{
    application::analytics::dto::EngineSummary, presentation::http::state::AppState,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    engine: &'static str,
    version: &'static str,
    summary: EngineSummary,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let summary = state.engine.summary().await;

    let engine = if summary.initialized {
        "running"
    } else {
        tracing::warn!("Health check: analytics engine is not running");
        "stopped"
    };

    let response = HealthResponse {
        status: "healthy",
        engine,
        version: env!("CARGO_PKG_VERSION"),
        summary,
    };

    (StatusCode::OK, Json(response))
}
