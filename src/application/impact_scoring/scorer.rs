use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::config::ImpactConfig;
use super::dto::{BenefitBreakdown, CostBenefitAnalysis, CostInputs};
use super::rules;
use crate::domain::analysis::entity::TrendInsight;
use crate::domain::impact::entity::{
    BusinessCategory, BusinessCategoryImpact, BusinessImpactAssessment, BusinessImpactCategories,
    BusinessIssue, BusinessRecommendation, ImpactProjection, ProjectedImpact,
};
use crate::domain::impact::snapshot::{BusinessMetrics, QualityMetrics};
use crate::domain::shared::errors::DomainError;
use crate::domain::shared::severity::RiskLevel;

const MAX_RECOMMENDATIONS: usize = 10;

/// Satisfaction at which projections are neutral; below it revenue erodes.
const NEUTRAL_SATISFACTION: f64 = 4.0;

fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn category_impact(factors: Vec<(&str, f64, f64)>, issues: Vec<BusinessIssue>) -> BusinessCategoryImpact {
    let score = clamp_score(factors.iter().map(|(_, value, weight)| value * weight).sum());
    BusinessCategoryImpact {
        score,
        risk_level: RiskLevel::from_score(score),
        factors: factors
            .into_iter()
            .map(|(name, value, _)| (name.to_string(), value))
            .collect::<HashMap<_, _>>(),
        issues,
    }
}

/// Translates KPI snapshots and insights into business impact assessments.
pub struct ImpactScorer {
    history: RwLock<VecDeque<BusinessImpactAssessment>>,
    config: ImpactConfig,
}

impl ImpactScorer {
    pub fn new(config: ImpactConfig) -> Result<Self, DomainError> {
        config.validate()?;
        info!(
            "Initializing ImpactScorer (revenue baseline {}, history limit {})",
            config.revenue_baseline, config.history_limit
        );
        Ok(Self {
            history: RwLock::new(VecDeque::new()),
            config,
        })
    }

    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    /// Scores the snapshots, records the assessment in history and returns it.
    #[instrument(skip_all, fields(insights = insights.len()))]
    pub async fn assess(
        &self,
        quality: &QualityMetrics,
        business: &BusinessMetrics,
        insights: &[TrendInsight],
    ) -> BusinessImpactAssessment {
        let assessment = self.evaluate(quality, business, insights);

        let mut history = self.history.write().await;
        history.push_back(assessment.clone());
        while history.len() > self.config.history_limit.max(1) {
            history.pop_front();
        }

        assessment
    }

    /// Scores the snapshots without touching history.
    pub fn evaluate(
        &self,
        quality: &QualityMetrics,
        business: &BusinessMetrics,
        insights: &[TrendInsight],
    ) -> BusinessImpactAssessment {
        let categories = self.score_categories(quality, business);
        let weights = &self.config.overall;
        let overall_score = clamp_score(
            categories.user_experience.score * weights.user_experience
                + categories.operational.score * weights.operational
                + categories.financial.score * weights.financial
                + categories.reputation.score * weights.reputation,
        );

        let recommendations = self.recommendations(&categories, insights);
        let assessment = BusinessImpactAssessment {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            overall_score,
            risk_level: RiskLevel::from_score(overall_score),
            categories,
            recommendations,
            projected_impact: self.project(business.user_satisfaction),
        };

        debug!(
            "Assessment {}: score {:.1}, risk {:?}, {} recommendations",
            assessment.id,
            assessment.overall_score,
            assessment.risk_level,
            assessment.recommendations.len()
        );
        assessment
    }

    fn score_categories(
        &self,
        quality: &QualityMetrics,
        business: &BusinessMetrics,
    ) -> BusinessImpactCategories {
        let revenue = self.config.revenue_baseline;
        let satisfaction = clamp_score(business.user_satisfaction / 5.0 * 100.0);
        let ux = &self.config.user_experience;
        let op = &self.config.operational;
        let fin = &self.config.financial;
        let rep = &self.config.reputation;

        BusinessImpactCategories {
            user_experience: category_impact(
                vec![
                    ("satisfaction", satisfaction, ux.satisfaction),
                    ("task_completion", clamp_score(business.task_completion_rate), ux.task_completion),
                    ("error_recovery", clamp_score(business.error_recovery_rate), ux.error_recovery),
                    ("accessibility", clamp_score(business.accessibility_score), ux.accessibility),
                ],
                rules::user_experience_issues(business, revenue),
            ),
            operational: category_impact(
                vec![
                    ("uptime", clamp_score(quality.availability), op.uptime),
                    ("incidents", clamp_score(100.0 - business.incident_count * 10.0), op.incidents),
                    (
                        "resource_utilization",
                        clamp_score(business.resource_utilization),
                        op.resource_utilization,
                    ),
                    ("maintenance", clamp_score(100.0 - business.maintenance_hours * 2.0), op.maintenance),
                ],
                rules::operational_issues(quality, business, revenue),
            ),
            financial: category_impact(
                vec![
                    (
                        "defect_cost_avoidance",
                        clamp_score(business.defect_cost_avoidance),
                        fin.defect_cost_avoidance,
                    ),
                    ("time_to_market", clamp_score(100.0 - business.time_to_market_days), fin.time_to_market),
                    (
                        "cost_per_feature",
                        clamp_score(100.0 - business.cost_per_feature / 1000.0),
                        fin.cost_per_feature,
                    ),
                    ("risk_reduction", clamp_score(business.risk_reduction), fin.risk_reduction),
                ],
                rules::financial_issues(business, revenue),
            ),
            reputation: category_impact(
                vec![
                    ("satisfaction", satisfaction, rep.satisfaction),
                    ("reliability", clamp_score(quality.availability), rep.reliability),
                    ("error_rate", clamp_score(100.0 - quality.error_rate * 10.0), rep.error_rate),
                    ("compliance", clamp_score(business.compliance_score), rep.compliance),
                ],
                rules::reputation_issues(quality, business, revenue),
            ),
        }
    }

    /// Issues from elevated-risk categories plus urgent insights, highest
    /// priority first, then highest ROI.
    fn recommendations(
        &self,
        categories: &BusinessImpactCategories,
        insights: &[TrendInsight],
    ) -> Vec<BusinessRecommendation> {
        let mut recommendations = Vec::new();

        for category in BusinessCategory::ALL {
            let impact = categories.get(category);
            if !impact.risk_level.is_elevated() {
                continue;
            }
            for issue in &impact.issues {
                let profile = rules::remediation_profile(issue.severity);
                recommendations.push(BusinessRecommendation {
                    id: Uuid::now_v7().to_string(),
                    category,
                    priority: issue.severity,
                    title: format!("Address {} risk: {}", category.label(), issue.description),
                    description: format!(
                        "The {} score is {:.1} ({:?} risk). {}.",
                        category.label(),
                        impact.score,
                        impact.risk_level,
                        issue.description
                    ),
                    expected_impact: format!(
                        "Protects an estimated {:.0} of annual revenue",
                        issue.estimated_impact
                    ),
                    effort: profile.effort,
                    timeframe: profile.timeframe.to_string(),
                    roi: profile.roi,
                    source_metric: None,
                });
            }
        }

        for insight in insights.iter().filter(|i| i.severity.is_urgent()) {
            let profile = rules::remediation_profile(insight.severity);
            recommendations.push(BusinessRecommendation {
                id: Uuid::now_v7().to_string(),
                category: BusinessCategory::infer_from_metric(&insight.metric),
                priority: insight.severity,
                title: format!("Respond to: {}", insight.title),
                description: insight.recommendation.clone(),
                expected_impact: insight.description.clone(),
                effort: profile.effort,
                timeframe: profile.timeframe.to_string(),
                roi: profile.roi,
                source_metric: Some(insight.metric.clone()),
            });
        }

        recommendations.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.roi.total_cmp(&a.roi))
        });
        recommendations.truncate(MAX_RECOMMENDATIONS);
        recommendations
    }

    /// Linear extrapolation of revenue and churn from current satisfaction.
    /// Magnitude grows with the horizon.
    fn project(&self, satisfaction: f64) -> ProjectedImpact {
        let pressure = ((NEUTRAL_SATISFACTION - satisfaction) / 5.0).clamp(-1.0, 1.0);
        let monthly_revenue = self.config.revenue_baseline / 12.0;

        let horizon = |name: &str, months: u32| {
            let revenue_impact = -monthly_revenue * months as f64 * pressure;
            let user_churn_percent = pressure * 2.0 * months as f64;
            let description = if pressure > 0.0 {
                format!(
                    "Over {} month(s) dissatisfaction puts about {:.0} of revenue at risk",
                    months,
                    revenue_impact.abs()
                )
            } else {
                format!(
                    "Over {} month(s) current satisfaction supports about {:.0} of additional revenue",
                    months, revenue_impact
                )
            };
            ImpactProjection {
                horizon: name.to_string(),
                months,
                revenue_impact,
                user_churn_percent,
                description,
            }
        };

        ProjectedImpact {
            short_term: horizon("short_term", 1),
            medium_term: horizon("medium_term", 3),
            long_term: horizon("long_term", 12),
        }
    }

    /// Annualised return of a quality investment, scaled by the latest assessment.
    /// Without one, the baseline snapshots are scored instead.
    pub async fn cost_benefit(&self, costs: &CostInputs) -> Result<CostBenefitAnalysis, DomainError> {
        costs.validate()?;

        let latest = match self.latest().await {
            Some(assessment) => assessment,
            None => self.evaluate(&QualityMetrics::default(), &BusinessMetrics::default(), &[]),
        };
        let revenue = self.config.revenue_baseline;
        let categories = &latest.categories;

        let benefits = BenefitBreakdown {
            defect_prevention: revenue * 0.03 * categories.financial.score / 100.0,
            downtime_reduction: revenue * 0.02 * categories.operational.score / 100.0,
            productivity: revenue * 0.015 * latest.overall_score / 100.0,
            customer_retention: revenue * 0.025 * categories.reputation.score / 100.0,
        };

        let total_costs = costs.total();
        let total_benefits = benefits.total();
        let net_benefit = total_benefits - total_costs;
        let roi_percent = if total_costs > 0.0 {
            net_benefit / total_costs * 100.0
        } else {
            0.0
        };
        let payback_months = (total_benefits > 0.0).then(|| total_costs / (total_benefits / 12.0));

        let recommendation = if roi_percent > 100.0 {
            "Strongly recommended: benefits exceed twice the investment."
        } else if net_benefit > 0.0 {
            "Recommended: the investment pays back within the year."
        } else {
            "Not recommended on financial grounds; revisit scope or costs."
        };

        Ok(CostBenefitAnalysis {
            total_costs,
            benefits,
            total_benefits,
            net_benefit,
            roi_percent,
            payback_months,
            recommendation: recommendation.to_string(),
        })
    }

    /// Assessments, oldest first.
    pub async fn history(&self) -> Vec<BusinessImpactAssessment> {
        self.history.read().await.iter().cloned().collect()
    }

    pub async fn latest(&self) -> Option<BusinessImpactAssessment> {
        self.history.read().await.back().cloned()
    }
}
