use super::helpers::{expect_status, get, post_json, read_json, read_text, send, spawn_app};
use axum::http::{StatusCode, header};
use serde_json::{Value, json};

#[tokio::test]
async fn health_reports_engine_state() {
    let app = spawn_app();
    let res = expect_status(send(&app.app, get("/health")).await, StatusCode::OK).await;
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = read_json(res).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["engine"], "stopped");
    assert_eq!(body["summary"]["metrics_collected"], 0);
}

#[tokio::test]
async fn record_metric_validates_samples() {
    let app = spawn_app();

    let ok = post_json(
        "/api/v1/metrics",
        &json!({
            "id": "response_time",
            "name": "Response Time",
            "category": "performance",
            "value": 180.0,
            "unit": "ms",
            "tags": { "service": "checkout" }
        }),
    );
    let res = expect_status(send(&app.app, ok).await, StatusCode::CREATED).await;
    let sample: Value = read_json(res).await;
    assert_eq!(sample["id"], "response_time");
    assert!(sample["timestamp"].is_string());

    let bad_id = post_json(
        "/api/v1/metrics",
        &json!({ "id": "Bad Id", "name": "x", "category": "quality", "value": 1.0 }),
    );
    let res = expect_status(send(&app.app, bad_id).await, StatusCode::BAD_REQUEST).await;
    let body: Value = read_json(res).await;
    assert!(body["error"].is_string());

    assert_eq!(app.engine.summary().await.metrics_collected, 1);
}

#[tokio::test]
async fn batch_reports_rejected_indices() {
    let app = spawn_app();
    let req = post_json(
        "/api/v1/metrics/batch",
        &json!([
            { "id": "error_rate", "name": "Error Rate", "category": "reliability", "value": 0.5 },
            { "id": "", "name": "Empty", "category": "reliability", "value": 0.5 },
            { "id": "error_rate", "name": "Error Rate", "category": "reliability", "value": 0.7 }
        ]),
    );
    let res = expect_status(send(&app.app, req).await, StatusCode::OK).await;
    let outcome: Value = read_json(res).await;
    assert_eq!(outcome["accepted"], 2);
    assert_eq!(outcome["rejected"][0]["index"], 1);
}

#[tokio::test]
async fn queued_samples_land_on_next_collection_cycle() {
    let app = spawn_app();
    let req = post_json(
        "/api/v1/metrics/queue",
        &json!([
            { "id": "availability", "name": "Availability", "category": "reliability", "value": 99.95 },
            { "id": "availability", "name": "Availability", "category": "reliability", "value": 99.97 }
        ]),
    );
    let res = expect_status(send(&app.app, req).await, StatusCode::ACCEPTED).await;
    let queued: Value = read_json(res).await;
    assert_eq!(queued["queued"], 2);
    assert_eq!(app.engine.summary().await.metrics_collected, 0);

    let outcome = app.engine.run_collection_cycle().await.unwrap();
    assert_eq!(outcome.accepted, 2);
    assert!(app.queue.is_empty().await);
    assert_eq!(app.engine.summary().await.metrics_collected, 2);
}

#[tokio::test]
async fn full_queue_is_service_unavailable() {
    let app = spawn_app();
    let samples: Vec<Value> = (0..101)
        .map(|i| json!({ "id": "cpu", "name": "CPU", "category": "performance", "value": i }))
        .collect();
    let res = send(&app.app, post_json("/api/v1/metrics/queue", &Value::Array(samples))).await;
    expect_status(res, StatusCode::SERVICE_UNAVAILABLE).await;
    assert!(app.queue.is_empty().await);
}

#[tokio::test]
async fn kpi_catalogue_and_values() {
    let app = spawn_app();

    let res = expect_status(send(&app.app, get("/api/v1/kpis")).await, StatusCode::OK).await;
    let kpis: Vec<Value> = read_json(res).await;
    assert_eq!(kpis.len(), 10);

    let res = send(&app.app, get("/api/v1/kpis/test_pass_rate/value")).await;
    expect_status(res, StatusCode::NOT_FOUND).await;

    let add = post_json(
        "/api/v1/kpis",
        &json!({
            "id": "x",
            "name": "X",
            "category": "quality",
            "formula": "manual",
            "target": 90.0,
            "threshold": { "critical": 40.0, "warning": 60.0, "good": 80.0 },
            "unit": "%",
            "frequency": "daily"
        }),
    );
    expect_status(send(&app.app, add).await, StatusCode::CREATED).await;

    let record = post_json(
        "/api/v1/metrics",
        &json!({ "id": "x", "name": "X", "category": "quality", "value": 35.0 }),
    );
    expect_status(send(&app.app, record).await, StatusCode::CREATED).await;

    let res = expect_status(
        send(&app.app, get("/api/v1/kpis/x/value")).await,
        StatusCode::OK,
    )
    .await;
    let value: Value = read_json(res).await;
    assert_eq!(value["value"], 35.0);
    assert_eq!(value["status"], "critical");

    let res = send(&app.app, get("/api/v1/kpis/unknown/value")).await;
    expect_status(res, StatusCode::NOT_FOUND).await;

    let res = send(
        &app.app,
        get("/api/v1/kpis/x/value?start=2026-01-01T00:00:00Z"),
    )
    .await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn dashboard_and_summary_render_on_empty_engine() {
    let app = spawn_app();
    let res = expect_status(send(&app.app, get("/api/v1/dashboard")).await, StatusCode::OK).await;
    let dashboard: Value = read_json(res).await;
    assert_eq!(dashboard["summary"]["total_metrics"], 0);
    assert_eq!(dashboard["summary"]["active_kpis"], 10);
    assert_eq!(dashboard["kpis"][0]["status"], "no_data");
    assert!(dashboard["impact"]["overall_score"].is_number());

    let res = expect_status(send(&app.app, get("/api/v1/summary")).await, StatusCode::OK).await;
    let summary: Value = read_json(res).await;
    assert_eq!(summary["kpis_defined"], 10);
    assert_eq!(summary["initialized"], false);
}

#[tokio::test]
async fn reports_validate_type_and_period() {
    let app = spawn_app();

    let res = expect_status(
        send(&app.app, get("/api/v1/reports/weekly")).await,
        StatusCode::OK,
    )
    .await;
    let report: Value = read_json(res).await;
    assert_eq!(report["report_type"], "weekly");
    assert_eq!(report["quality_trends"].as_array().unwrap().len(), 7);

    let res = send(&app.app, get("/api/v1/reports/yearly")).await;
    expect_status(res, StatusCode::BAD_REQUEST).await;

    let res = send(&app.app, get("/api/v1/reports/custom")).await;
    expect_status(res, StatusCode::BAD_REQUEST).await;

    let res = send(
        &app.app,
        get("/api/v1/reports/custom?start=2026-01-02T00:00:00Z&end=2026-01-01T00:00:00Z"),
    )
    .await;
    expect_status(res, StatusCode::BAD_REQUEST).await;

    let res = send(
        &app.app,
        get("/api/v1/reports/custom?start=2026-01-01T00:00:00Z&end=2026-01-02T00:00:00Z"),
    )
    .await;
    expect_status(res, StatusCode::OK).await;
}

#[tokio::test]
async fn trends_reject_bad_parameters() {
    let app = spawn_app();
    let res = send(&app.app, get("/api/v1/trends/test_pass_rate")).await;
    expect_status(res, StatusCode::NOT_FOUND).await;

    let res = send(&app.app, get("/api/v1/trends/test_pass_rate?unit=fortnight")).await;
    expect_status(res, StatusCode::BAD_REQUEST).await;

    let res = send(&app.app, get("/api/v1/trends/test_pass_rate?periods=0")).await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn trends_accept_periods_beyond_the_calendar() {
    let app = spawn_app();
    let record = post_json(
        "/api/v1/metrics",
        &json!({
            "id": "test_pass_rate",
            "name": "Test pass rate",
            "category": "quality",
            "value": 97.0
        }),
    );
    expect_status(send(&app.app, record).await, StatusCode::CREATED).await;

    for query in ["unit=quarter&periods=2000000", "unit=minute&periods=4294967295"] {
        let res = send(&app.app, get(&format!("/api/v1/trends/test_pass_rate?{}", query))).await;
        let res = expect_status(res, StatusCode::OK).await;
        let trend: Value = read_json(res).await;
        assert_eq!(trend["data_points"].as_array().unwrap().len(), 1);
        assert_eq!(trend["trend"], "stable");
    }
}

#[tokio::test]
async fn cost_benefit_rejects_negative_costs() {
    let app = spawn_app();

    let res = send(
        &app.app,
        post_json("/api/v1/cost-benefit", &json!({ "implementation": 50000.0, "tooling": 5000.0 })),
    )
    .await;
    let res = expect_status(res, StatusCode::OK).await;
    let analysis: Value = read_json(res).await;
    assert_eq!(analysis["total_costs"], 55000.0);
    assert!(analysis["recommendation"].is_string());

    let res = send(
        &app.app,
        post_json("/api/v1/cost-benefit", &json!({ "implementation": -1.0 })),
    )
    .await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn export_formats() {
    let app = spawn_app();
    let record = post_json(
        "/api/v1/metrics",
        &json!({
            "id": "user_satisfaction",
            "name": "Satisfaction, survey",
            "category": "usability",
            "value": 4.2
        }),
    );
    expect_status(send(&app.app, record).await, StatusCode::CREATED).await;

    let res = expect_status(
        send(&app.app, get("/api/v1/export?format=csv")).await,
        StatusCode::OK,
    )
    .await;
    assert!(
        res.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let csv = read_text(res).await;
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows[0], "id,name,category,value,unit,timestamp,tags");
    assert!(rows[1].starts_with("user_satisfaction,\"Satisfaction, survey\",usability,4.2,"));

    let res = send(&app.app, get("/api/v1/export?format=xml")).await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}
