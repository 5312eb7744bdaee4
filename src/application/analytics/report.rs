use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::domain::analysis::entity::{
    AnomalyDetection, CorrelationAnalysis, DataPoint, TrendDirection,
};
use crate::domain::impact::entity::BusinessRecommendation;
use crate::domain::metric::value_objects::Timeframe;
use crate::domain::shared::errors::DomainError;
use crate::domain::shared::severity::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReportType {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    /// Caller supplies the period
    Custom,
}

impl ReportType {
    /// Default look-back; `None` for custom reports.
    pub fn span(self) -> Option<Duration> {
        match self {
            ReportType::Daily => Some(Duration::hours(24)),
            ReportType::Weekly => Some(Duration::days(7)),
            ReportType::Monthly => Some(Duration::days(30)),
            ReportType::Quarterly => Some(Duration::days(90)),
            ReportType::Custom => None,
        }
    }

    /// An explicit period wins; otherwise the default span ending at `now`.
    pub fn resolve_period(
        self,
        period: Option<Timeframe>,
        now: DateTime<Utc>,
    ) -> Result<Timeframe, DomainError> {
        match (period, self.span()) {
            (Some(period), _) => Ok(period),
            (None, Some(span)) => Ok(Timeframe::ending_at(now, span)),
            (None, None) => Err(DomainError::InvalidInput(
                "custom reports require a start and end".into(),
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Daily => "daily",
            ReportType::Weekly => "weekly",
            ReportType::Monthly => "monthly",
            ReportType::Quarterly => "quarterly",
            ReportType::Custom => "custom",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportType::Daily),
            "weekly" => Ok(ReportType::Weekly),
            "monthly" => Ok(ReportType::Monthly),
            "quarterly" => Ok(ReportType::Quarterly),
            "custom" => Ok(ReportType::Custom),
            other => Err(DomainError::InvalidInput(format!(
                "unknown report type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExecutiveSummary {
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    pub health_score: f64,
    pub key_findings: Vec<String>,
    pub top_risks: Vec<String>,
}

/// Period-over-period movement of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QualityTrend {
    pub metric: String,
    pub current: Option<f64>,
    /// Same-length period immediately before
    pub previous: Option<f64>,
    pub change_percent: Option<f64>,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PerformanceAnalysis {
    pub average_response_time: Option<f64>,
    pub p95_response_time: Option<f64>,
    pub availability: Option<f64>,
    pub error_rate: Option<f64>,
    pub response_time_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportAppendices {
    pub raw_data: HashMap<String, Vec<DataPoint>>,
    pub anomalies: Vec<AnomalyDetection>,
    pub correlations: Vec<CorrelationAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnalyticsReport {
    pub id: String,
    pub report_type: ReportType,
    pub period: Timeframe,
    pub generated_at: DateTime<Utc>,
    pub executive_summary: ExecutiveSummary,
    pub quality_trends: Vec<QualityTrend>,
    pub performance: PerformanceAnalysis,
    pub recommendations: Vec<BusinessRecommendation>,
    pub appendices: ReportAppendices,
}
