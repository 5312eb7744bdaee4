use quality_analytics::{
    application::{
        analytics::orchestrator::AnalyticsOrchestrator, impact_scoring::scorer::ImpactScorer,
        trend_analysis::analyzer::TrendAnalyzer,
    },
    config::Config,
    domain::alert::entity::Alert,
    infrastructure::{
        alerts::dispatcher::AlertDispatcher, queue::sample_queue::SampleQueue,
        store::metric_store::MetricStore,
    },
    presentation::http::{routes::create_router, state::AppState},
};
use axum::extract::DefaultBodyLimit;
use http::{HeaderValue, Method, header};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG wins; otherwise engine debug logs plus request traces
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| {
            tracing_subscriber::EnvFilter::try_new("info,quality_analytics=debug,tower_http=debug")
        })
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env()?;

    let store = Arc::new(MetricStore::with_config(config.store()));
    let analyzer = Arc::new(TrendAnalyzer::new(config.analyzer()));
    let scorer = Arc::new(ImpactScorer::new(config.impact())?);
    let alerts = Arc::new(AlertDispatcher::new());
    let queue = Arc::new(SampleQueue::new(config.sample_queue_capacity));

    let engine = Arc::new(AnalyticsOrchestrator::new(
        store,
        analyzer,
        scorer,
        alerts,
        queue.clone(),
        config.orchestrator(),
    ));
    engine.on_alert(Arc::new(|alert: &Alert| -> anyhow::Result<()> {
        tracing::warn!(
            severity = alert.severity.as_str(),
            metric = alert.metric.as_deref().unwrap_or("-"),
            "ALERT {}: {}",
            alert.title,
            alert.description
        );
        Ok(())
    }));
    engine.initialize().await;

    let state = AppState {
        engine: engine.clone(),
        queue,
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let app = create_router(state)
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Quality analytics listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, initiating graceful shutdown");
        }
    }
}
