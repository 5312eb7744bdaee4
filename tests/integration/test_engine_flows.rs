use super::helpers::{expect_status, get, post_json, read_json, read_text, send, spawn_app};
use axum::http::StatusCode;
use chrono::{Duration, SecondsFormat, Utc};
use quality_analytics::domain::alert::entity::Alert;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn declining_pass_rate_is_reported_as_declining() {
    let app = spawn_app();
    let now = Utc::now();

    let samples: Vec<Value> = (0..24)
        .map(|i| {
            let at = now - Duration::hours(23 - i) - Duration::minutes(5);
            json!({
                "id": "test_pass_rate",
                "name": "Test Pass Rate",
                "category": "quality",
                "value": 100.0 - i as f64,
                "unit": "%",
                "timestamp": at.to_rfc3339_opts(SecondsFormat::Millis, true)
            })
        })
        .collect();
    let res = send(&app.app, post_json("/api/v1/metrics/batch", &Value::Array(samples))).await;
    let outcome: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(outcome["accepted"], 24);

    let res = send(
        &app.app,
        get("/api/v1/trends/test_pass_rate?unit=hour&periods=24"),
    )
    .await;
    let trend: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(trend["trend"], "declining");
    assert!(trend["change_rate"].as_f64().unwrap() < 0.0);
    assert_eq!(trend["data_points"].as_array().unwrap().len(), 24);

    // The analysis is kept and surfaces on the dashboard
    let res = send(&app.app, get("/api/v1/dashboard")).await;
    let dashboard: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert!(!dashboard["insights"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn json_export_round_trips_the_summary() {
    let app = spawn_app();
    for value in [97.0, 96.5, 98.0] {
        let req = post_json(
            "/api/v1/metrics",
            &json!({ "id": "test_pass_rate", "name": "Test Pass Rate", "category": "quality", "value": value }),
        );
        expect_status(send(&app.app, req).await, StatusCode::CREATED).await;
    }

    let res = send(&app.app, get("/api/v1/export?format=json")).await;
    let body = read_text(expect_status(res, StatusCode::OK).await).await;
    let export: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(
        export["dashboard"]["summary"]["total_metrics"],
        export["summary"]["metrics_collected"]
    );
    assert_eq!(
        export["summary"]["metrics_collected"].as_u64(),
        Some(app.engine.summary().await.metrics_collected as u64)
    );
    assert_eq!(export["series"]["test_pass_rate"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn realtime_cycle_delivers_alerts_past_a_failing_subscriber() {
    let app = spawn_app();
    let delivered = Arc::new(Mutex::new(Vec::<Alert>::new()));

    app.engine
        .on_alert(Arc::new(|_: &Alert| -> anyhow::Result<()> {
            anyhow::bail!("pager offline")
        }));
    app.engine.on_alert(Arc::new(|_: &Alert| -> anyhow::Result<()> {
        panic!("subscriber bug")
    }));
    let sink = delivered.clone();
    app.engine
        .on_alert(Arc::new(move |alert: &Alert| -> anyhow::Result<()> {
            sink.lock().unwrap().push(alert.clone());
            Ok(())
        }));

    for minutes_ago in [40, 30, 20, 10] {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        let req = post_json(
            "/api/v1/metrics",
            &json!({
                "id": "availability",
                "name": "Availability",
                "category": "reliability",
                "value": 90.0,
                "timestamp": at.to_rfc3339_opts(SecondsFormat::Millis, true)
            }),
        );
        expect_status(send(&app.app, req).await, StatusCode::CREATED).await;
    }

    let outcome = app.engine.run_realtime_cycle().await;
    assert!(outcome.alerts_raised >= 1);
    assert_eq!(delivered.lock().unwrap().len(), outcome.alerts_raised);
}

#[tokio::test]
async fn initialize_and_shutdown_through_the_engine() {
    let app = spawn_app();
    app.engine.initialize().await;

    let res = send(&app.app, get("/health")).await;
    let health: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(health["engine"], "running");

    app.engine.shutdown().await;
    assert!(!app.engine.is_initialized());
}
