use chrono::{Duration, Utc};
use quality_analytics::{
    application::trend_analysis::{analyzer::TrendAnalyzer, config::AnalyzerConfig},
    domain::{
        analysis::entity::{
            AnomalyType, CorrelationDirection, CorrelationStrength, DataPoint, TrendDirection,
        },
        metric::{
            entity::MetricCategory,
            kpi::{KpiDefinition, KpiDirection, KpiThreshold},
        },
        shared::severity::Severity,
    },
};
use std::collections::HashMap;

fn series(values: &[f64]) -> Vec<DataPoint> {
    let start = Utc::now() - Duration::hours(values.len() as i64);
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| DataPoint {
            timestamp: start + Duration::hours(i as i64),
            value,
        })
        .collect()
}

fn analyzer() -> TrendAnalyzer {
    TrendAnalyzer::new(AnalyzerConfig::default())
}

#[test]
fn monotonic_series_classify_by_direction() {
    let analyzer = analyzer();
    let rising: Vec<f64> = (0..20).map(|i| 80.0 + i as f64).collect();
    let falling: Vec<f64> = rising.iter().rev().copied().collect();

    assert_eq!(
        analyzer.calculate_trend(&series(&rising)).trend,
        TrendDirection::Improving
    );
    assert_eq!(
        analyzer.calculate_trend(&series(&falling)).trend,
        TrendDirection::Declining
    );
}

#[test]
fn high_variance_series_is_volatile() {
    let values: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 10.0 } else { 50.0 }).collect();
    let classification = analyzer().calculate_trend(&series(&values));
    assert!(classification.volatility > 20.0);
    assert_eq!(classification.trend, TrendDirection::Volatile);
}

#[test]
fn extreme_spike_is_a_critical_spike() {
    let mut values: Vec<f64> = (0..59).map(|i| if i % 2 == 0 { 9.0 } else { 11.0 }).collect();
    values.push(60.0);
    let points = series(&values);

    let anomalies = analyzer().detect_anomalies("response_time", &points);
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].value, 60.0);
    assert_eq!(anomalies[0].severity, Severity::Critical);
    assert_eq!(anomalies[0].anomaly_type, AnomalyType::Spike);
}

#[test]
fn self_correlation_and_negation() {
    let analyzer = analyzer();
    let values: Vec<f64> = (1..=20).map(|v| v as f64 * 1.5 + (v % 3) as f64).collect();
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();

    let same = analyzer
        .correlate("a", &series(&values), "a", &series(&values))
        .unwrap();
    assert!((same.correlation - 1.0).abs() < 1e-9);
    assert_eq!(same.strength, CorrelationStrength::VeryStrong);
    assert_eq!(same.direction, CorrelationDirection::Positive);

    let opposite = analyzer
        .correlate("a", &series(&values), "b", &series(&negated))
        .unwrap();
    assert!((opposite.correlation + 1.0).abs() < 1e-9);
    assert_eq!(opposite.direction, CorrelationDirection::Negative);
}

#[tokio::test]
async fn identical_series_yield_very_strong_pair() {
    let analyzer = analyzer();
    let values: Vec<f64> = (1..=20).map(|v| v as f64).collect();
    let mut input = HashMap::new();
    input.insert("a".to_string(), series(&values));
    input.insert("b".to_string(), series(&values));

    let found = analyzer.analyze_correlations(&input).await;
    assert_eq!(found.len(), 1);
    assert!((found[0].correlation - 1.0).abs() < 1e-9);
    assert_eq!(found[0].strength, CorrelationStrength::VeryStrong);
    assert_eq!(analyzer.correlations().await.len(), 1);
}

#[test]
fn forecast_confidence_never_increases() {
    let values: Vec<f64> = (0..12).map(|i| 50.0 + i as f64 * 2.0).collect();
    let forecast = analyzer().forecast(&series(&values), 12);
    assert_eq!(forecast.len(), 12);
    assert!(
        forecast
            .windows(2)
            .all(|pair| pair[1].confidence <= pair[0].confidence)
    );
    assert!(forecast.iter().all(|f| f.predicted_value >= 0.0));
}

#[tokio::test]
async fn single_point_below_critical_threshold_is_critical() {
    let kpi = KpiDefinition {
        id: "x".into(),
        name: "X".into(),
        category: MetricCategory::Quality,
        formula: String::new(),
        target: 90.0,
        threshold: KpiThreshold {
            critical: 40.0,
            warning: 60.0,
            good: 80.0,
        },
        unit: "%".into(),
        frequency: "daily".into(),
        direction: KpiDirection::HigherIsBetter,
    };

    let insights = analyzer()
        .analyze_trend("x", &series(&[35.0]), Some(&kpi))
        .await;
    assert!(!insights.is_empty());
    assert_eq!(insights[0].severity, Severity::Critical);
    assert_eq!(insights[0].data.change_percent, 0.0);
}

#[test]
fn degenerate_inputs_produce_empty_results() {
    let analyzer = analyzer();
    let flat = series(&[5.0; 30]);

    assert!(analyzer.detect_anomalies("flat", &flat).is_empty());
    assert!(analyzer.correlate("flat", &flat, "flat2", &flat).is_none());
    assert!(analyzer.forecast(&series(&[1.0]), 6).is_empty());
    assert!(analyzer.detect_seasonal_patterns("flat", &[]).is_empty());
}
