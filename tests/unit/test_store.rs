use chrono::{Duration, Utc};
use quality_analytics::{
    domain::{
        metric::{entity::MetricCategory, value_objects::NewMetricSample},
        shared::errors::DomainError,
    },
    infrastructure::store::{
        aggregation::Aggregation,
        metric_store::{MetricStore, StoreConfig},
    },
};

#[tokio::test]
async fn series_never_exceeds_cap_and_evicts_oldest_first() {
    let store = MetricStore::with_config(StoreConfig {
        max_samples_per_series: 25,
    });
    let start = Utc::now() - Duration::hours(2);

    for i in 0..100 {
        store
            .record(
                NewMetricSample::new("error_rate", MetricCategory::Reliability, i as f64)
                    .at(start + Duration::minutes(i)),
            )
            .await
            .unwrap();
    }

    let series = store.series("error_rate").await.unwrap();
    assert_eq!(series.len(), 25);
    assert_eq!(series.first().unwrap().value, 75.0);
    assert_eq!(series.last().unwrap().value, 99.0);
}

#[tokio::test]
async fn non_finite_values_are_rejected_not_coerced() {
    let store = MetricStore::new();
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let result = store
            .record(NewMetricSample::new("availability", MetricCategory::Reliability, value))
            .await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }
    assert!(store.series("availability").await.is_none());
    assert_eq!(store.summary().await.total_samples, 0);
}

#[tokio::test]
async fn malformed_ids_are_rejected() {
    let store = MetricStore::new();
    let result = store
        .record(NewMetricSample::new("Has Spaces", MetricCategory::Quality, 1.0))
        .await;
    assert!(matches!(result, Err(DomainError::InvalidInput(_))));
}

#[tokio::test]
async fn kpi_values_use_registered_aggregation() {
    let store = MetricStore::new();
    let now = Utc::now();
    for (minutes_ago, value) in [(30, 70.0), (20, 80.0), (10, 90.0)] {
        store
            .record(
                NewMetricSample::new("test_pass_rate", MetricCategory::Quality, value)
                    .at(now - Duration::minutes(minutes_ago)),
            )
            .await
            .unwrap();
    }

    assert_eq!(store.kpi_value("test_pass_rate", None).await.unwrap(), 80.0);

    store
        .register_aggregation("test_pass_rate", Aggregation::Latest)
        .await;
    assert_eq!(store.kpi_value("test_pass_rate", None).await.unwrap(), 90.0);

    store
        .register_aggregation(
            "test_pass_rate",
            Aggregation::custom(|values: &[f64]| values.len() as f64),
        )
        .await;
    assert_eq!(store.kpi_value("test_pass_rate", None).await.unwrap(), 3.0);
}

#[tokio::test]
async fn unknown_kpi_and_empty_window_are_not_found() {
    let store = MetricStore::new();
    assert!(matches!(
        store.kpi_value("no_such_kpi", None).await,
        Err(DomainError::NotFound(_))
    ));
    // Known KPI, but nothing recorded yet
    assert!(matches!(
        store.kpi_value("availability", None).await,
        Err(DomainError::NotFound(_))
    ));
}
