use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use ts_rs::TS;

use super::dto::{Dashboard, EngineSummary};
use crate::domain::metric::entity::MetricSample;
use crate::domain::metric::kpi::KpiDefinition;
use crate::domain::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(DomainError::InvalidInput(format!(
                "unsupported export format '{}'",
                other
            ))),
        }
    }
}

/// Everything the engine currently knows, captured at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExportBundle {
    pub exported_at: DateTime<Utc>,
    pub dashboard: Dashboard,
    pub summary: EngineSummary,
    pub series: BTreeMap<String, Vec<MetricSample>>,
    pub kpis: Vec<KpiDefinition>,
}

/// Serialised export body with its media type.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub body: String,
}

impl ExportPayload {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

const CSV_HEADER: &str = "id,name,category,value,unit,timestamp,tags";

/// RFC 4180 field quoting.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per sample; tags flattened to `k=v;k=v` in key order.
pub fn samples_to_csv<'a>(samples: impl IntoIterator<Item = &'a MetricSample>) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");

    for sample in samples {
        let mut tags: Vec<(&String, &String)> = sample.tags.iter().collect();
        tags.sort();
        let tags = tags
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(";");

        let row = [
            csv_field(&sample.id),
            csv_field(&sample.name),
            sample.category.as_str().to_string(),
            sample.value.to_string(),
            csv_field(&sample.unit),
            sample.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            csv_field(&tags),
        ];
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}
