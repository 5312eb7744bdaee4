use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entity::MetricCategory;
use crate::domain::shared::errors::DomainError;
use crate::domain::shared::severity::Severity;

/// Which way is "better" for a KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum KpiDirection {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

/// Threshold bands. For higher-is-better KPIs `critical < warning < good`;
/// lower-is-better KPIs mirror the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KpiThreshold {
    pub critical: f64,
    pub warning: f64,
    pub good: f64,
}

/// Named, thresholded aggregate over a metric series.
///
/// The KPI id doubles as the id of the series it aggregates. Registering a
/// definition with an existing id replaces the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KpiDefinition {
    pub id: String,
    pub name: String,
    pub category: MetricCategory,
    /// How the KPI is computed, for humans
    pub formula: String,
    pub target: f64,
    pub threshold: KpiThreshold,
    pub unit: String,
    /// Expected reporting cadence (`realtime`, `hourly`, `daily`, ...)
    pub frequency: String,
    #[serde(default)]
    pub direction: KpiDirection,
}

impl KpiDefinition {
    /// Bands the latest value against the thresholds.
    ///
    /// Higher-is-better: `< critical` critical, `< warning` high, `< good` medium, else low.
    /// Lower-is-better uses the mirrored comparisons.
    pub fn severity_for(&self, value: f64) -> Severity {
        let t = &self.threshold;
        if self.breaches(value, t.critical) {
            Severity::Critical
        } else if self.breaches(value, t.warning) {
            Severity::High
        } else if self.breaches(value, t.good) {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn violates_warning(&self, value: f64) -> bool {
        self.breaches(value, self.threshold.warning)
    }

    pub fn violates_critical(&self, value: f64) -> bool {
        self.breaches(value, self.threshold.critical)
    }

    /// Rejects definitions that could never be evaluated.
    pub fn check(&self) -> Result<(), DomainError> {
        if self.id.trim().is_empty() || self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "KPI id and name must not be empty".into(),
            ));
        }
        let t = &self.threshold;
        if ![self.target, t.critical, t.warning, t.good]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(DomainError::InvalidInput(format!(
                "KPI '{}' has non-finite target or thresholds",
                self.id
            )));
        }
        Ok(())
    }

    /// Dashboard status label for a current value.
    pub fn status(&self, value: f64) -> &'static str {
        match self.severity_for(value) {
            Severity::Critical => "critical",
            Severity::High => "warning",
            Severity::Medium => "fair",
            Severity::Low => "good",
        }
    }

    fn breaches(&self, value: f64, bound: f64) -> bool {
        match self.direction {
            KpiDirection::HigherIsBetter => value < bound,
            KpiDirection::LowerIsBetter => value > bound,
        }
    }
}

/// KPI ids the engine knows about out of the box.
pub mod ids {
    pub const TEST_PASS_RATE: &str = "test_pass_rate";
    pub const CODE_COVERAGE: &str = "code_coverage";
    pub const DEFECT_ESCAPE_RATE: &str = "defect_escape_rate";
    pub const AVAILABILITY: &str = "availability";
    pub const RESPONSE_TIME: &str = "response_time";
    pub const ERROR_RATE: &str = "error_rate";
    pub const MEAN_TIME_TO_RECOVERY: &str = "mean_time_to_recovery";
    pub const USER_SATISFACTION: &str = "user_satisfaction";
    pub const TASK_COMPLETION_RATE: &str = "task_completion_rate";
    pub const SECURITY_VULNERABILITIES: &str = "security_vulnerabilities";
}

#[allow(clippy::too_many_arguments)]
fn kpi(
    id: &str,
    name: &str,
    category: MetricCategory,
    formula: &str,
    target: f64,
    (critical, warning, good): (f64, f64, f64),
    unit: &str,
    frequency: &str,
    direction: KpiDirection,
) -> KpiDefinition {
    KpiDefinition {
        id: id.to_string(),
        name: name.to_string(),
        category,
        formula: formula.to_string(),
        target,
        threshold: KpiThreshold {
            critical,
            warning,
            good,
        },
        unit: unit.to_string(),
        frequency: frequency.to_string(),
        direction,
    }
}

/// Built-in KPI catalogue registered by every store.
pub fn default_kpis() -> Vec<KpiDefinition> {
    use KpiDirection::{HigherIsBetter, LowerIsBetter};
    use MetricCategory::*;

    vec![
        kpi(
            ids::TEST_PASS_RATE,
            "Test Pass Rate",
            Quality,
            "passed tests / executed tests * 100",
            95.0,
            (80.0, 90.0, 95.0),
            "%",
            "per build",
            HigherIsBetter,
        ),
        kpi(
            ids::CODE_COVERAGE,
            "Code Coverage",
            Quality,
            "covered lines / total lines * 100",
            80.0,
            (60.0, 70.0, 80.0),
            "%",
            "per build",
            HigherIsBetter,
        ),
        kpi(
            ids::DEFECT_ESCAPE_RATE,
            "Defect Escape Rate",
            Quality,
            "production defects / total defects * 100",
            2.0,
            (10.0, 5.0, 2.0),
            "%",
            "weekly",
            LowerIsBetter,
        ),
        kpi(
            ids::AVAILABILITY,
            "Availability",
            Reliability,
            "uptime / total time * 100",
            99.9,
            (99.0, 99.5, 99.9),
            "%",
            "realtime",
            HigherIsBetter,
        ),
        kpi(
            ids::RESPONSE_TIME,
            "Response Time",
            Performance,
            "mean request latency",
            200.0,
            (1000.0, 500.0, 200.0),
            "ms",
            "realtime",
            LowerIsBetter,
        ),
        kpi(
            ids::ERROR_RATE,
            "Error Rate",
            Reliability,
            "failed requests / total requests * 100",
            1.0,
            (5.0, 2.0, 1.0),
            "%",
            "realtime",
            LowerIsBetter,
        ),
        kpi(
            ids::MEAN_TIME_TO_RECOVERY,
            "Mean Time To Recovery",
            Reliability,
            "sum(recovery minutes) / incidents",
            30.0,
            (240.0, 120.0, 30.0),
            "min",
            "per incident",
            LowerIsBetter,
        ),
        kpi(
            ids::USER_SATISFACTION,
            "User Satisfaction",
            Usability,
            "mean survey score (1-5)",
            4.5,
            (3.0, 3.5, 4.0),
            "score",
            "daily",
            HigherIsBetter,
        ),
        kpi(
            ids::TASK_COMPLETION_RATE,
            "Task Completion Rate",
            Usability,
            "completed tasks / started tasks * 100",
            90.0,
            (70.0, 80.0, 90.0),
            "%",
            "daily",
            HigherIsBetter,
        ),
        kpi(
            ids::SECURITY_VULNERABILITIES,
            "Open Security Vulnerabilities",
            Security,
            "count of open vulnerabilities",
            0.0,
            (5.0, 2.0, 0.0),
            "count",
            "daily",
            LowerIsBetter,
        ),
    ]
}
