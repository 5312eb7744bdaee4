use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{domain::metric::value_objects::Timeframe, presentation::http::errors::AppError};

pub mod analytics;
pub mod health;
pub mod kpis;
pub mod metrics;

/// Optional `?start=&end=` pair (RFC 3339).
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl PeriodQuery {
    pub fn timeframe(&self) -> Result<Option<Timeframe>, AppError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(Some(Timeframe::new(start, end)?)),
            (None, None) => Ok(None),
            _ => Err(AppError::BadRequest(
                "start and end must be given together".into(),
            )),
        }
    }
}
