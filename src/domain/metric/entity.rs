use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::domain::analysis::entity::DataPoint;
use crate::domain::shared::errors::DomainError;

/// Broad family a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MetricCategory {
    Performance,
    Quality,
    Reliability,
    Security,
    Usability,
    Business,
}

impl MetricCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricCategory::Performance => "performance",
            MetricCategory::Quality => "quality",
            MetricCategory::Reliability => "reliability",
            MetricCategory::Security => "security",
            MetricCategory::Usability => "usability",
            MetricCategory::Business => "business",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "performance" => Ok(MetricCategory::Performance),
            "quality" => Ok(MetricCategory::Quality),
            "reliability" => Ok(MetricCategory::Reliability),
            "security" => Ok(MetricCategory::Security),
            "usability" => Ok(MetricCategory::Usability),
            "business" => Ok(MetricCategory::Business),
            other => Err(DomainError::InvalidInput(format!(
                "unknown metric category '{}'",
                other
            ))),
        }
    }
}

/// A single recorded measurement.
///
/// # Invariants
/// - `id` is the series key; every sample with the same `id` belongs to one series
/// - `value` is always finite (enforced when the sample is built from a `NewMetricSample`)
/// - samples are immutable once recorded and are only ever appended or evicted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MetricSample {
    /// Series key this sample is appended to
    pub id: String,

    /// Human readable metric name
    pub name: String,

    pub category: MetricCategory,

    pub value: f64,

    /// Unit of `value` (`%`, `ms`, `count`, ...)
    pub unit: String,

    pub timestamp: DateTime<Utc>,

    /// Free-form dimensions (environment, service, region, ...)
    pub tags: HashMap<String, String>,
}

impl MetricSample {
    pub fn data_point(&self) -> DataPoint {
        DataPoint {
            timestamp: self.timestamp,
            value: self.value,
        }
    }
}
