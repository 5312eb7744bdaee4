use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::domain::analysis::entity::TrendInsight;
use crate::domain::impact::entity::BusinessRecommendation;
use crate::domain::shared::severity::Severity;

/// What raised the alert.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AlertSource {
    Insight,
    BusinessImpact,
}

/// Alert handed to notification collaborators (email, paging, UI toast).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, TS)]
#[ts(export)]
pub struct Alert {
    pub id: String,
    pub source: AlertSource,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub metric: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn from_insight(insight: &TrendInsight) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            source: AlertSource::Insight,
            severity: insight.severity,
            title: insight.title.clone(),
            description: insight.description.clone(),
            metric: Some(insight.metric.clone()),
            created_at: Utc::now(),
        }
    }

    pub fn from_recommendation(recommendation: &BusinessRecommendation) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            source: AlertSource::BusinessImpact,
            severity: recommendation.priority,
            title: recommendation.title.clone(),
            description: recommendation.description.clone(),
            metric: recommendation.source_metric.clone(),
            created_at: Utc::now(),
        }
    }
}
