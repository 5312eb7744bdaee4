use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use super::PeriodQuery;
use crate::{
    application::analytics::{
        dto::{Dashboard, EngineSummary},
        export::ExportFormat,
        report::{AnalyticsReport, ReportType},
    },
    application::impact_scoring::dto::{CostBenefitAnalysis, CostInputs},
    domain::analysis::entity::TrendData,
    domain::metric::value_objects::TimeUnit,
    presentation::http::{errors::AppError, state::AppState},
};

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    unit: Option<String>,
    #[serde(default = "default_periods")]
    periods: u32,
}

fn default_periods() -> u32 {
    24
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    format: Option<String>,
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    Json(state.engine.dashboard().await)
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(report_type): Path<String>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<AnalyticsReport>, AppError> {
    let report_type: ReportType = report_type.parse()?;
    let report = state
        .engine
        .report(report_type, params.timeframe()?)
        .await?;
    Ok(Json(report))
}

pub async fn get_trend(
    State(state): State<AppState>,
    Path(metric): Path<String>,
    Query(params): Query<TrendQuery>,
) -> Result<Json<TrendData>, AppError> {
    let unit: TimeUnit = match params.unit.as_deref() {
        Some(unit) => unit.parse()?,
        None => TimeUnit::Hour,
    };
    let trend = state
        .engine
        .trend_analysis(&metric, unit, params.periods)
        .await?;
    Ok(Json(trend))
}

pub async fn cost_benefit(
    State(state): State<AppState>,
    Json(costs): Json<CostInputs>,
) -> Result<Json<CostBenefitAnalysis>, AppError> {
    Ok(Json(state.engine.cost_benefit(&costs).await?))
}

pub async fn export_data(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let format: ExportFormat = match params.format.as_deref() {
        Some(format) => format.parse()?,
        None => ExportFormat::Json,
    };
    let payload = state.engine.export(format).await?;
    Ok(([(header::CONTENT_TYPE, payload.content_type())], payload.body))
}

pub async fn get_summary(State(state): State<AppState>) -> Json<EngineSummary> {
    Json(state.engine.summary().await)
}
