use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::{
    domain::metric::{entity::MetricSample, value_objects::NewMetricSample},
    infrastructure::store::metric_store::BatchOutcome,
    presentation::http::{errors::AppError, state::AppState},
};

#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: usize,
    pub pending: usize,
}

pub async fn record_metric(
    State(state): State<AppState>,
    Json(sample): Json<NewMetricSample>,
) -> Result<(StatusCode, Json<MetricSample>), AppError> {
    let recorded = state.engine.record_metric(sample).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Records what it can; invalid samples are reported by index.
pub async fn record_batch(
    State(state): State<AppState>,
    Json(samples): Json<Vec<NewMetricSample>>,
) -> Json<BatchOutcome> {
    Json(state.engine.record_batch(samples).await)
}

/// Hands samples to the collection loop instead of recording them inline.
pub async fn enqueue_metrics(
    State(state): State<AppState>,
    Json(samples): Json<Vec<NewMetricSample>>,
) -> Result<(StatusCode, Json<QueuedResponse>), AppError> {
    let queued = state.queue.push(samples).await?;
    let pending = state.queue.len().await;
    Ok((StatusCode::ACCEPTED, Json(QueuedResponse { queued, pending })))
}
