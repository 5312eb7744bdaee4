//! Fixed issue rules per business category.
//!
//! Estimated impact is the share of annual revenue considered at risk for an
//! issue of the given severity.

use crate::domain::impact::entity::{BusinessIssue, Effort};
use crate::domain::impact::snapshot::{BusinessMetrics, QualityMetrics};
use crate::domain::shared::severity::Severity;

fn revenue_share(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 0.10,
        Severity::High => 0.05,
        Severity::Medium => 0.02,
        Severity::Low => 0.01,
    }
}

fn issue(description: String, severity: Severity, revenue_baseline: f64) -> BusinessIssue {
    BusinessIssue {
        description,
        severity,
        estimated_impact: revenue_baseline * revenue_share(severity),
    }
}

/// Effort, timeframe and ROI assigned to a recommendation of the given priority.
pub struct RemediationProfile {
    pub effort: Effort,
    pub timeframe: &'static str,
    pub roi: f64,
}

pub fn remediation_profile(priority: Severity) -> RemediationProfile {
    match priority {
        Severity::Critical => RemediationProfile {
            effort: Effort::High,
            timeframe: "immediate (1-2 weeks)",
            roi: 3.0,
        },
        Severity::High => RemediationProfile {
            effort: Effort::Medium,
            timeframe: "short-term (2-4 weeks)",
            roi: 2.5,
        },
        Severity::Medium => RemediationProfile {
            effort: Effort::Medium,
            timeframe: "1-2 months",
            roi: 2.0,
        },
        Severity::Low => RemediationProfile {
            effort: Effort::Low,
            timeframe: "quarterly",
            roi: 1.5,
        },
    }
}

pub fn user_experience_issues(business: &BusinessMetrics, revenue_baseline: f64) -> Vec<BusinessIssue> {
    let mut issues = Vec::new();

    if business.user_satisfaction < 3.0 {
        issues.push(issue(
            format!("User satisfaction critically low at {:.1}/5", business.user_satisfaction),
            Severity::Critical,
            revenue_baseline,
        ));
    } else if business.user_satisfaction < 3.5 {
        issues.push(issue(
            format!("User satisfaction below expectations at {:.1}/5", business.user_satisfaction),
            Severity::High,
            revenue_baseline,
        ));
    }

    if business.task_completion_rate < 80.0 {
        issues.push(issue(
            format!("Only {:.1}% of user tasks complete", business.task_completion_rate),
            Severity::High,
            revenue_baseline,
        ));
    }

    if business.error_recovery_rate < 70.0 {
        issues.push(issue(
            format!("Users recover from only {:.1}% of errors", business.error_recovery_rate),
            Severity::Medium,
            revenue_baseline,
        ));
    }

    if business.accessibility_score < 90.0 {
        issues.push(issue(
            format!("Accessibility score at {:.1}", business.accessibility_score),
            Severity::Medium,
            revenue_baseline,
        ));
    }

    issues
}

pub fn operational_issues(
    quality: &QualityMetrics,
    business: &BusinessMetrics,
    revenue_baseline: f64,
) -> Vec<BusinessIssue> {
    let mut issues = Vec::new();

    if quality.availability < 99.0 {
        issues.push(issue(
            format!("Uptime critically low at {:.2}%", quality.availability),
            Severity::Critical,
            revenue_baseline,
        ));
    } else if quality.availability < 99.5 {
        issues.push(issue(
            format!("Uptime below target at {:.2}%", quality.availability),
            Severity::High,
            revenue_baseline,
        ));
    }

    if business.incident_count > 5.0 {
        issues.push(issue(
            format!("{} incidents in the period", business.incident_count),
            Severity::High,
            revenue_baseline,
        ));
    }

    if business.resource_utilization > 85.0 {
        issues.push(issue(
            format!("Resource utilization at {:.1}%", business.resource_utilization),
            Severity::Medium,
            revenue_baseline,
        ));
    }

    if business.maintenance_hours > 20.0 {
        issues.push(issue(
            format!("{:.1} hours spent on maintenance", business.maintenance_hours),
            Severity::Medium,
            revenue_baseline,
        ));
    }

    issues
}

pub fn financial_issues(business: &BusinessMetrics, revenue_baseline: f64) -> Vec<BusinessIssue> {
    let mut issues = Vec::new();

    if business.defect_cost_avoidance < 50.0 {
        issues.push(issue(
            format!("Defect cost avoidance at {:.1}%", business.defect_cost_avoidance),
            Severity::Medium,
            revenue_baseline,
        ));
    }

    if business.time_to_market_days > 30.0 {
        issues.push(issue(
            format!("Time to market at {:.0} days", business.time_to_market_days),
            Severity::High,
            revenue_baseline,
        ));
    }

    if business.cost_per_feature > 50_000.0 {
        issues.push(issue(
            format!("Cost per feature at {:.0}", business.cost_per_feature),
            Severity::Medium,
            revenue_baseline,
        ));
    }

    if business.risk_reduction < 40.0 {
        issues.push(issue(
            format!("Risk reduction at {:.1}%", business.risk_reduction),
            Severity::Medium,
            revenue_baseline,
        ));
    }

    issues
}

pub fn reputation_issues(
    quality: &QualityMetrics,
    business: &BusinessMetrics,
    revenue_baseline: f64,
) -> Vec<BusinessIssue> {
    let mut issues = Vec::new();

    if business.user_satisfaction < 3.0 {
        issues.push(issue(
            "Low satisfaction is likely to surface in public reviews".to_string(),
            Severity::Critical,
            revenue_baseline,
        ));
    }

    if quality.error_rate > 5.0 {
        issues.push(issue(
            format!("User-visible error rate at {:.1}%", quality.error_rate),
            Severity::High,
            revenue_baseline,
        ));
    }

    if business.compliance_score < 80.0 {
        issues.push(issue(
            format!("Compliance score critically low at {:.1}", business.compliance_score),
            Severity::Critical,
            revenue_baseline,
        ));
    } else if business.compliance_score < 90.0 {
        issues.push(issue(
            format!("Compliance score at {:.1}", business.compliance_score),
            Severity::High,
            revenue_baseline,
        ));
    }

    if quality.availability < 99.0 {
        issues.push(issue(
            format!("Reliability perceived as poor at {:.2}% uptime", quality.availability),
            Severity::High,
            revenue_baseline,
        ));
    }

    issues
}
