use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::domain::shared::severity::{RiskLevel, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BusinessCategory {
    UserExperience,
    Operational,
    Financial,
    Reputation,
}

impl BusinessCategory {
    pub const ALL: [BusinessCategory; 4] = [
        BusinessCategory::UserExperience,
        BusinessCategory::Operational,
        BusinessCategory::Financial,
        BusinessCategory::Reputation,
    ];

    /// Infers the category a metric belongs to from its name.
    pub fn infer_from_metric(metric: &str) -> Self {
        let metric = metric.to_ascii_lowercase();
        if metric.contains("satisfaction") || metric.contains("user") {
            BusinessCategory::UserExperience
        } else if metric.contains("cost") || metric.contains("financial") {
            BusinessCategory::Financial
        } else if metric.contains("reputation") || metric.contains("brand") {
            BusinessCategory::Reputation
        } else {
            BusinessCategory::Operational
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BusinessCategory::UserExperience => "user experience",
            BusinessCategory::Operational => "operational",
            BusinessCategory::Financial => "financial",
            BusinessCategory::Reputation => "reputation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BusinessIssue {
    pub description: String,
    pub severity: Severity,
    /// Estimated annual revenue at risk
    pub estimated_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BusinessCategoryImpact {
    pub score: f64,
    pub risk_level: RiskLevel,
    /// Normalised 0-100 factor scores that went into `score`
    pub factors: HashMap<String, f64>,
    pub issues: Vec<BusinessIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BusinessImpactCategories {
    pub user_experience: BusinessCategoryImpact,
    pub operational: BusinessCategoryImpact,
    pub financial: BusinessCategoryImpact,
    pub reputation: BusinessCategoryImpact,
}

impl BusinessImpactCategories {
    pub fn get(&self, category: BusinessCategory) -> &BusinessCategoryImpact {
        match category {
            BusinessCategory::UserExperience => &self.user_experience,
            BusinessCategory::Operational => &self.operational,
            BusinessCategory::Financial => &self.financial,
            BusinessCategory::Reputation => &self.reputation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Effort {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BusinessRecommendation {
    pub id: String,
    pub category: BusinessCategory,
    pub priority: Severity,
    pub title: String,
    pub description: String,
    pub expected_impact: String,
    pub effort: Effort,
    pub timeframe: String,
    /// Expected return per unit invested
    pub roi: f64,
    /// Metric the recommendation originated from, for insight-driven recommendations
    pub source_metric: Option<String>,
}

/// Projection for one horizon. Negative `revenue_impact` is a loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImpactProjection {
    pub horizon: String,
    pub months: u32,
    pub revenue_impact: f64,
    /// Percent of users expected to churn (negative means net gain)
    pub user_churn_percent: f64,
    pub description: String,
}

impl ImpactProjection {
    pub fn magnitude(&self) -> f64 {
        self.revenue_impact.abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProjectedImpact {
    pub short_term: ImpactProjection,
    pub medium_term: ImpactProjection,
    pub long_term: ImpactProjection,
}

/// Immutable snapshot of the business impact of current technical quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BusinessImpactAssessment {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// In `[0, 100]`
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    pub categories: BusinessImpactCategories,
    pub recommendations: Vec<BusinessRecommendation>,
    pub projected_impact: ProjectedImpact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_category_from_metric_name() {
        assert_eq!(
            BusinessCategory::infer_from_metric("user_satisfaction"),
            BusinessCategory::UserExperience
        );
        assert_eq!(
            BusinessCategory::infer_from_metric("active_users"),
            BusinessCategory::UserExperience
        );
        assert_eq!(
            BusinessCategory::infer_from_metric("cost_per_feature"),
            BusinessCategory::Financial
        );
        assert_eq!(
            BusinessCategory::infer_from_metric("brand_mentions"),
            BusinessCategory::Reputation
        );
        assert_eq!(
            BusinessCategory::infer_from_metric("response_time"),
            BusinessCategory::Operational
        );
    }
}
