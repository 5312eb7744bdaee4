use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

/// Costs of a proposed quality investment, in the revenue currency.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct CostInputs {
    #[validate(range(min = 0.0))]
    pub implementation: f64,

    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub tooling: f64,

    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub training: f64,

    /// Annual upkeep
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub maintenance: f64,

    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub other: f64,
}

impl CostInputs {
    pub fn total(&self) -> f64 {
        self.implementation + self.tooling + self.training + self.maintenance + self.other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BenefitBreakdown {
    pub defect_prevention: f64,
    pub downtime_reduction: f64,
    pub productivity: f64,
    pub customer_retention: f64,
}

impl BenefitBreakdown {
    pub fn total(&self) -> f64 {
        self.defect_prevention + self.downtime_reduction + self.productivity + self.customer_retention
    }
}

/// Annualised return of a quality investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostBenefitAnalysis {
    pub total_costs: f64,
    pub benefits: BenefitBreakdown,
    pub total_benefits: f64,
    pub net_benefit: f64,
    /// `net / costs * 100`; zero when nothing is spent
    pub roi_percent: f64,
    /// Months of benefits needed to cover the costs; absent when there are no benefits
    pub payback_months: Option<f64>,
    pub recommendation: String,
}
