//! Weights and baselines for business impact scoring.

use crate::domain::shared::errors::DomainError;

const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct UserExperienceWeights {
    pub satisfaction: f64,
    pub task_completion: f64,
    pub error_recovery: f64,
    pub accessibility: f64,
}

#[derive(Debug, Clone)]
pub struct OperationalWeights {
    pub uptime: f64,
    pub incidents: f64,
    pub resource_utilization: f64,
    pub maintenance: f64,
}

#[derive(Debug, Clone)]
pub struct FinancialWeights {
    pub defect_cost_avoidance: f64,
    pub time_to_market: f64,
    pub cost_per_feature: f64,
    pub risk_reduction: f64,
}

#[derive(Debug, Clone)]
pub struct ReputationWeights {
    pub satisfaction: f64,
    pub reliability: f64,
    pub error_rate: f64,
    pub compliance: f64,
}

/// Blend of the four category scores into the overall score
#[derive(Debug, Clone)]
pub struct OverallWeights {
    pub user_experience: f64,
    pub operational: f64,
    pub financial: f64,
    pub reputation: f64,
}

#[derive(Debug, Clone)]
pub struct ImpactConfig {
    pub user_experience: UserExperienceWeights,
    pub operational: OperationalWeights,
    pub financial: FinancialWeights,
    pub reputation: ReputationWeights,
    pub overall: OverallWeights,

    /// Annual revenue the projections and cost-benefit figures scale against
    pub revenue_baseline: f64,

    /// Assessments retained; the oldest is dropped first
    pub history_limit: usize,
}

impl ImpactConfig {
    /// Every weight set must sum to 1.0.
    pub fn validate(&self) -> Result<(), DomainError> {
        let ux = &self.user_experience;
        let op = &self.operational;
        let fin = &self.financial;
        let rep = &self.reputation;
        let all = &self.overall;

        let sets = [
            (
                "user_experience",
                ux.satisfaction + ux.task_completion + ux.error_recovery + ux.accessibility,
            ),
            (
                "operational",
                op.uptime + op.incidents + op.resource_utilization + op.maintenance,
            ),
            (
                "financial",
                fin.defect_cost_avoidance
                    + fin.time_to_market
                    + fin.cost_per_feature
                    + fin.risk_reduction,
            ),
            (
                "reputation",
                rep.satisfaction + rep.reliability + rep.error_rate + rep.compliance,
            ),
            (
                "overall",
                all.user_experience + all.operational + all.financial + all.reputation,
            ),
        ];

        for (name, sum) in sets {
            if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                return Err(DomainError::InvalidInput(format!(
                    "{} weights sum to {}, expected 1.0",
                    name, sum
                )));
            }
        }

        if !(self.revenue_baseline.is_finite() && self.revenue_baseline >= 0.0) {
            return Err(DomainError::InvalidInput(
                "revenue baseline must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            user_experience: UserExperienceWeights {
                satisfaction: 0.35,
                task_completion: 0.30,
                error_recovery: 0.20,
                accessibility: 0.15,
            },
            operational: OperationalWeights {
                uptime: 0.35,
                incidents: 0.25,
                resource_utilization: 0.20,
                maintenance: 0.20,
            },
            financial: FinancialWeights {
                defect_cost_avoidance: 0.30,
                time_to_market: 0.25,
                cost_per_feature: 0.25,
                risk_reduction: 0.20,
            },
            reputation: ReputationWeights {
                satisfaction: 0.30,
                reliability: 0.30,
                error_rate: 0.20,
                compliance: 0.20,
            },
            overall: OverallWeights {
                user_experience: 0.30,
                operational: 0.25,
                financial: 0.25,
                reputation: 0.20,
            },
            revenue_baseline: 10_000_000.0,
            history_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_valid() {
        assert!(ImpactConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let mut config = ImpactConfig::default();
        config.operational.uptime = 0.5;
        assert!(matches!(
            config.validate(),
            Err(DomainError::InvalidInput(msg)) if msg.contains("operational")
        ));
    }
}
