//! Point-in-time inputs to impact scoring.
//!
//! Defaults are the documented baseline used when a KPI has no samples in the
//! requested window: each field sits at its KPI target, so a missing series
//! neither inflates nor deflates a score.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Technical quality KPIs read from the metric store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QualityMetrics {
    /// Percent of tests passing
    pub test_pass_rate: f64,
    /// Percent of code covered by tests
    pub code_coverage: f64,
    /// Percent of defects reaching production
    pub defect_escape_rate: f64,
    /// Percent uptime
    pub availability: f64,
    /// Mean latency in milliseconds
    pub response_time_ms: f64,
    /// Percent of failed requests
    pub error_rate: f64,
    pub mean_time_to_recovery_minutes: f64,
    pub security_vulnerabilities: f64,
}

impl Default for QualityMetrics {
    fn default() -> Self {
        Self {
            test_pass_rate: 95.0,
            code_coverage: 80.0,
            defect_escape_rate: 2.0,
            availability: 99.9,
            response_time_ms: 200.0,
            error_rate: 1.0,
            mean_time_to_recovery_minutes: 30.0,
            security_vulnerabilities: 0.0,
        }
    }
}

/// Business-facing KPIs. Percent fields are on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BusinessMetrics {
    /// Survey score on a 1-5 scale
    pub user_satisfaction: f64,
    pub task_completion_rate: f64,
    pub error_recovery_rate: f64,
    pub accessibility_score: f64,
    /// Incidents in the assessed period
    pub incident_count: f64,
    pub resource_utilization: f64,
    /// Planned + unplanned maintenance hours in the period
    pub maintenance_hours: f64,
    pub defect_cost_avoidance: f64,
    pub time_to_market_days: f64,
    pub cost_per_feature: f64,
    pub risk_reduction: f64,
    pub compliance_score: f64,
}

impl Default for BusinessMetrics {
    fn default() -> Self {
        Self {
            user_satisfaction: 4.5,
            task_completion_rate: 90.0,
            error_recovery_rate: 85.0,
            accessibility_score: 95.0,
            incident_count: 0.0,
            resource_utilization: 70.0,
            maintenance_hours: 4.0,
            defect_cost_avoidance: 75.0,
            time_to_market_days: 14.0,
            cost_per_feature: 10_000.0,
            risk_reduction: 70.0,
            compliance_score: 98.0,
        }
    }
}
