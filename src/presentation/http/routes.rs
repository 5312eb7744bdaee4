use super::{
    handlers::{analytics, health, kpis, metrics},
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/metrics", post(metrics::record_metric))
        .route("/api/v1/metrics/batch", post(metrics::record_batch))
        .route("/api/v1/metrics/queue", post(metrics::enqueue_metrics))
        .route("/api/v1/kpis", get(kpis::list_kpis).post(kpis::add_kpi))
        .route("/api/v1/kpis/{id}/value", get(kpis::kpi_value))
        .route("/api/v1/dashboard", get(analytics::get_dashboard))
        .route("/api/v1/reports/{report_type}", get(analytics::get_report))
        .route("/api/v1/trends/{metric}", get(analytics::get_trend))
        .route("/api/v1/cost-benefit", post(analytics::cost_benefit))
        .route("/api/v1/export", get(analytics::export_data))
        .route("/api/v1/summary", get(analytics::get_summary))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
