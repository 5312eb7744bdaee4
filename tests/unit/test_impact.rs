use quality_analytics::{
    application::impact_scoring::{config::ImpactConfig, scorer::ImpactScorer},
    domain::{
        impact::snapshot::{BusinessMetrics, QualityMetrics},
        shared::severity::RiskLevel,
    },
};

fn scorer() -> ImpactScorer {
    ImpactScorer::new(ImpactConfig::default()).unwrap()
}

#[test]
fn overall_score_stays_in_range_for_wild_inputs() {
    let scorer = scorer();
    let extremes = [-1e9, -100.0, 0.0, 50.0, 100.0, 1e9];

    for &value in &extremes {
        let quality = QualityMetrics {
            test_pass_rate: value,
            code_coverage: value,
            defect_escape_rate: value,
            availability: value,
            response_time_ms: value,
            error_rate: value,
            mean_time_to_recovery_minutes: value,
            security_vulnerabilities: value,
        };
        let business = BusinessMetrics {
            user_satisfaction: value,
            task_completion_rate: value,
            error_recovery_rate: value,
            accessibility_score: value,
            incident_count: value,
            resource_utilization: value,
            maintenance_hours: value,
            defect_cost_avoidance: value,
            time_to_market_days: value,
            cost_per_feature: value,
            risk_reduction: value,
            compliance_score: value,
        };

        let assessment = scorer.evaluate(&quality, &business, &[]);
        assert!(
            (0.0..=100.0).contains(&assessment.overall_score),
            "score {} out of range for input {}",
            assessment.overall_score,
            value
        );
        assert_eq!(
            assessment.risk_level,
            RiskLevel::from_score(assessment.overall_score)
        );
        assert!(assessment.recommendations.len() <= 10);
    }
}

#[test]
fn risk_bands_are_exact() {
    assert_eq!(RiskLevel::from_score(80.0), RiskLevel::Low);
    assert_eq!(RiskLevel::from_score(79.9), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_score(60.0), RiskLevel::Medium);
    assert_eq!(RiskLevel::from_score(59.9), RiskLevel::High);
    assert_eq!(RiskLevel::from_score(40.0), RiskLevel::High);
    assert_eq!(RiskLevel::from_score(39.9), RiskLevel::Critical);
}

#[test]
fn projected_impact_grows_with_horizon() {
    let scorer = scorer();
    for satisfaction in [1.0, 2.5, 4.0, 4.8] {
        let business = BusinessMetrics {
            user_satisfaction: satisfaction,
            ..BusinessMetrics::default()
        };
        let projected = scorer
            .evaluate(&QualityMetrics::default(), &business, &[])
            .projected_impact;
        assert!(projected.short_term.magnitude() <= projected.medium_term.magnitude());
        assert!(projected.medium_term.magnitude() <= projected.long_term.magnitude());
    }
}

#[test]
fn unbalanced_weights_are_rejected() {
    let mut config = ImpactConfig::default();
    config.overall.user_experience += 0.1;
    assert!(ImpactScorer::new(config).is_err());
}
