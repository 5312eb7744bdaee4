//! Derived analysis results. None of these are stored as raw data; they are
//! recomputed from a series window and replace earlier results for the same metric.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::domain::metric::value_objects::{TimeUnit, Timeframe};
use crate::domain::shared::severity::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
    Volatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub predicted_value: f64,
    /// Decays with distance from the last observation; never below 0.5
    pub confidence: f64,
}

/// Trend view over one metric window, computed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendData {
    pub metric: String,
    pub timeframe: TimeUnit,
    pub periods: u32,
    pub data_points: Vec<DataPoint>,
    pub trend: TrendDirection,
    /// Percent change between the averages of the second and first half
    pub change_rate: f64,
    pub volatility: f64,
    pub forecast: Option<Vec<ForecastPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum InsightType {
    Improvement,
    Degradation,
    Anomaly,
    Pattern,
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InsightData {
    pub current_value: f64,
    pub previous_value: Option<f64>,
    pub change_percent: f64,
    pub threshold: Option<f64>,
}

/// Structured finding produced by the trend analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendInsight {
    pub id: String,
    pub metric: String,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    /// In `[0, 1]`
    pub confidence: f64,
    pub detected_at: DateTime<Utc>,
    pub affected_timeframe: Option<Timeframe>,
    pub data: InsightData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AnomalyType {
    Spike,
    Drop,
    Drift,
    Outlier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnomalyDetection {
    pub metric: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub expected_value: f64,
    /// Absolute z-score of the point against the window
    pub deviation: f64,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PatternKind {
    /// Hour-of-day buckets
    Daily,
    /// Day-of-week buckets
    Weekly,
    /// Day-of-month buckets
    Monthly,
    /// Month-within-quarter buckets
    Quarterly,
}

impl PatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Daily => "daily",
            PatternKind::Weekly => "weekly",
            PatternKind::Monthly => "monthly",
            PatternKind::Quarterly => "quarterly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SeasonalPattern {
    pub metric: String,
    pub pattern: PatternKind,
    pub peaks: Vec<u32>,
    pub valleys: Vec<u32>,
    pub amplitude: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    /// `< 0.3` weak, `< 0.5` moderate, `< 0.7` strong, otherwise very strong.
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude < 0.3 {
            CorrelationStrength::Weak
        } else if magnitude < 0.5 {
            CorrelationStrength::Moderate
        } else if magnitude < 0.7 {
            CorrelationStrength::Strong
        } else {
            CorrelationStrength::VeryStrong
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

/// Pearson correlation between two metrics. Symmetric; one entry per unordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CorrelationAnalysis {
    pub metric1: String,
    pub metric2: String,
    pub correlation: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    pub significance: f64,
}

impl CorrelationAnalysis {
    pub fn involves(&self, metric: &str) -> bool {
        self.metric1 == metric || self.metric2 == metric
    }
}
