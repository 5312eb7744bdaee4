use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Severity of a finding. Ordered so that `Critical` sorts highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// High and critical findings are the ones promoted to insights, recommendations and alerts.
    pub fn is_urgent(self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business risk derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Fixed bands: `>= 80` low, `>= 60` medium, `>= 40` high, anything else critical.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::Low
        } else if score >= 60.0 {
            RiskLevel::Medium
        } else if score >= 40.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn is_elevated(self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}
