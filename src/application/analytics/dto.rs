use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::domain::analysis::entity::{AnomalyDetection, CorrelationAnalysis, TrendInsight};
use crate::domain::impact::entity::BusinessImpactAssessment;
use crate::domain::metric::entity::MetricCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    /// Samples currently retained across all series
    pub total_metrics: usize,
    pub active_kpis: usize,
    pub critical_insights: usize,
    pub health_score: f64,
    pub last_updated: DateTime<Utc>,
}

/// Current value of one KPI against its targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KpiSnapshot {
    pub id: String,
    pub name: String,
    pub category: MetricCategory,
    /// Absent when the series has no samples yet
    pub value: Option<f64>,
    pub target: f64,
    pub unit: String,
    /// `good`, `fair`, `warning`, `critical`, or `no_data`
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    pub summary: DashboardSummary,
    pub kpis: Vec<KpiSnapshot>,
    /// Top insights by severity, then confidence
    pub insights: Vec<TrendInsight>,
    pub impact: BusinessImpactAssessment,
    /// Last 24 hours, newest first
    pub anomalies: Vec<AnomalyDetection>,
    /// Strong and very strong pairs only
    pub correlations: Vec<CorrelationAnalysis>,
    pub health_score: f64,
}

/// Engine counters exposed to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EngineSummary {
    pub metrics_collected: usize,
    pub series_count: usize,
    pub kpis_defined: usize,
    pub insights_generated: usize,
    pub anomalies_detected: usize,
    pub last_collection: Option<DateTime<Utc>>,
    pub is_collecting: bool,
    pub initialized: bool,
}

/// Result of one collection cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CollectionOutcome {
    pub collected: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Result of one real-time analysis cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RealtimeOutcome {
    pub metrics_analyzed: usize,
    pub insights: usize,
    pub alerts_raised: usize,
    pub overall_score: f64,
}
