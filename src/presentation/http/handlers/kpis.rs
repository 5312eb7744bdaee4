use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;

use super::PeriodQuery;
use crate::{
    domain::metric::kpi::KpiDefinition,
    presentation::http::{errors::AppError, state::AppState},
};

#[derive(Debug, Serialize)]
pub struct KpiValueResponse {
    pub kpi: String,
    pub value: f64,
    pub status: &'static str,
}

pub async fn list_kpis(State(state): State<AppState>) -> Json<Vec<KpiDefinition>> {
    Json(state.engine.store().kpis().await)
}

pub async fn add_kpi(
    State(state): State<AppState>,
    Json(definition): Json<KpiDefinition>,
) -> Result<(StatusCode, Json<KpiDefinition>), AppError> {
    state.engine.add_kpi(definition.clone()).await?;
    Ok((StatusCode::CREATED, Json(definition)))
}

pub async fn kpi_value(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<KpiValueResponse>, AppError> {
    let store = state.engine.store();
    let definition = store
        .kpi_definition(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("KPI '{}'", id)))?;
    let value = store.kpi_value(&id, params.timeframe()?).await?;

    Ok(Json(KpiValueResponse {
        status: definition.status(value),
        kpi: id,
        value,
    }))
}
