//! Composition root of the analytics engine.
//!
//! The orchestrator owns no analysis state of its own: it drives the collection
//! and real-time loops and assembles dashboards, reports and exports from the
//! store, the analyzer and the scorer.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::config::OrchestratorConfig;
use super::dto::{
    CollectionOutcome, Dashboard, DashboardSummary, EngineSummary, KpiSnapshot, RealtimeOutcome,
};
use super::export::{ExportBundle, ExportFormat, ExportPayload, samples_to_csv};
use super::report::{
    AnalyticsReport, ExecutiveSummary, PerformanceAnalysis, QualityTrend, ReportAppendices,
    ReportType,
};
use crate::application::impact_scoring::dto::{CostBenefitAnalysis, CostInputs};
use crate::application::impact_scoring::scorer::ImpactScorer;
use crate::application::trend_analysis::analyzer::TrendAnalyzer;
use crate::application::trend_analysis::stats;
use crate::domain::alert::entity::Alert;
use crate::domain::analysis::entity::{CorrelationStrength, DataPoint, TrendData, TrendInsight};
use crate::domain::impact::entity::BusinessImpactAssessment;
use crate::domain::impact::snapshot::{BusinessMetrics, QualityMetrics};
use crate::domain::metric::entity::MetricSample;
use crate::domain::metric::kpi::{KpiDefinition, ids};
use crate::domain::metric::source::MetricSource;
use crate::domain::metric::value_objects::{NewMetricSample, TimeUnit, Timeframe};
use crate::domain::shared::errors::DomainError;
use crate::domain::shared::severity::Severity;
use crate::infrastructure::alerts::dispatcher::{AlertDispatcher, AlertSubscriber};
use crate::infrastructure::store::metric_store::{BatchOutcome, MetricStore, StoreSummary};
use crate::workers::collection_worker::CollectionWorker;
use crate::workers::realtime_analysis_worker::RealtimeAnalysisWorker;

const DASHBOARD_INSIGHTS: usize = 5;
const DASHBOARD_ANOMALIES: usize = 10;
const DASHBOARD_CORRELATIONS: usize = 5;

/// Metrics whose period-over-period movement is reported.
const REPORTED_TRENDS: [&str; 7] = [
    ids::TEST_PASS_RATE,
    ids::CODE_COVERAGE,
    ids::DEFECT_ESCAPE_RATE,
    ids::AVAILABILITY,
    ids::RESPONSE_TIME,
    ids::ERROR_RATE,
    ids::USER_SATISFACTION,
];

/// Series ids read into the business snapshot besides the KPI catalogue.
mod business_ids {
    pub const ERROR_RECOVERY_RATE: &str = "error_recovery_rate";
    pub const ACCESSIBILITY_SCORE: &str = "accessibility_score";
    pub const INCIDENT_COUNT: &str = "incident_count";
    pub const RESOURCE_UTILIZATION: &str = "resource_utilization";
    pub const MAINTENANCE_HOURS: &str = "maintenance_hours";
    pub const DEFECT_COST_AVOIDANCE: &str = "defect_cost_avoidance";
    pub const TIME_TO_MARKET_DAYS: &str = "time_to_market_days";
    pub const COST_PER_FEATURE: &str = "cost_per_feature";
    pub const RISK_REDUCTION: &str = "risk_reduction";
    pub const COMPLIANCE_SCORE: &str = "compliance_score";
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Weighted blend of the headline KPIs, in `[0, 100]`.
pub fn health_score(quality: &QualityMetrics, business: &BusinessMetrics) -> f64 {
    let blended = clamp_percent(quality.test_pass_rate) * 0.20
        + clamp_percent(quality.availability) * 0.20
        + clamp_percent(business.user_satisfaction / 5.0 * 100.0) * 0.20
        + clamp_percent(100.0 - quality.defect_escape_rate * 10.0) * 0.15
        + clamp_percent(100.0 - quality.response_time_ms / 10.0) * 0.15
        + clamp_percent(100.0 - quality.error_rate * 10.0) * 0.10;
    clamp_percent(blended)
}

#[derive(Default)]
struct Lifecycle {
    shutdown: Option<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

pub struct AnalyticsOrchestrator {
    store: Arc<MetricStore>,
    analyzer: Arc<TrendAnalyzer>,
    scorer: Arc<ImpactScorer>,
    alerts: Arc<AlertDispatcher>,
    source: Arc<dyn MetricSource>,
    config: OrchestratorConfig,
    lifecycle: Mutex<Lifecycle>,
    initialized: AtomicBool,
    last_collection: RwLock<Option<DateTime<Utc>>>,
}

impl AnalyticsOrchestrator {
    pub fn new(
        store: Arc<MetricStore>,
        analyzer: Arc<TrendAnalyzer>,
        scorer: Arc<ImpactScorer>,
        alerts: Arc<AlertDispatcher>,
        source: Arc<dyn MetricSource>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            analyzer,
            scorer,
            alerts,
            source,
            config,
            lifecycle: Mutex::new(Lifecycle::default()),
            initialized: AtomicBool::new(false),
            last_collection: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    pub fn analyzer(&self) -> &Arc<TrendAnalyzer> {
        &self.analyzer
    }

    pub fn scorer(&self) -> &Arc<ImpactScorer> {
        &self.scorer
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Starts the collection loop and, when enabled, the real-time loop.
    /// Calling it again while running does nothing. The loops hold the engine
    /// weakly and stop on their own if it is dropped without `shutdown`.
    pub async fn initialize(self: &Arc<Self>) {
        let mut lifecycle = self.lifecycle.lock().await;
        if self.is_initialized() {
            debug!("Analytics engine already initialized");
            return;
        }

        let (tx, rx) = watch::channel(false);

        let collection = CollectionWorker::new(Arc::downgrade(self), self.config.collection_interval);
        let collection_rx = rx.clone();
        lifecycle
            .tasks
            .push(tokio::spawn(async move { collection.start(collection_rx).await }));

        if self.config.enable_real_time_analysis {
            let realtime = RealtimeAnalysisWorker::new(Arc::downgrade(self), self.config.realtime_interval());
            lifecycle
                .tasks
                .push(tokio::spawn(async move { realtime.start(rx).await }));
        }

        lifecycle.shutdown = Some(tx);
        self.initialized.store(true, Ordering::SeqCst);
        info!(
            "Analytics engine initialized (collection every {:?}, real-time analysis {})",
            self.config.collection_interval,
            if self.config.enable_real_time_analysis {
                "enabled"
            } else {
                "disabled"
            }
        );
    }

    /// Stops both loops and waits for them to finish.
    pub async fn shutdown(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Some(tx) = lifecycle.shutdown.take() {
            let _ = tx.send(true);
        }
        for task in lifecycle.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("Analytics loop ended abnormally: {}", e);
            }
        }

        self.store.set_collecting(false);
        if self.initialized.swap(false, Ordering::SeqCst) {
            info!("Analytics engine shut down");
        }
    }

    pub async fn record_metric(&self, sample: NewMetricSample) -> Result<MetricSample, DomainError> {
        self.store.record(sample).await
    }

    pub async fn record_batch(&self, samples: Vec<NewMetricSample>) -> BatchOutcome {
        self.store.record_batch(samples).await
    }

    pub async fn add_kpi(&self, definition: KpiDefinition) -> Result<(), DomainError> {
        definition.check()?;
        self.store.add_kpi(definition).await;
        Ok(())
    }

    pub fn on_alert(&self, subscriber: Arc<dyn AlertSubscriber>) {
        self.alerts.subscribe(subscriber);
    }

    /// Pulls one batch from the source and records it.
    ///
    /// Returns `None` when the source failed or timed out; the cycle is skipped.
    #[instrument(skip(self))]
    pub async fn run_collection_cycle(&self) -> Option<CollectionOutcome> {
        self.store.set_collecting(true);
        let collected =
            tokio::time::timeout(self.config.collection_timeout, self.source.collect()).await;
        let outcome = match collected {
            Ok(Ok(samples)) => {
                let collected = samples.len();
                let batch = self.store.record_batch(samples).await;
                *self.last_collection.write().await = Some(Utc::now());
                Some(CollectionOutcome {
                    collected,
                    accepted: batch.accepted,
                    rejected: batch.rejected.len(),
                })
            }
            Ok(Err(e)) => {
                warn!("Metric collection failed, skipping cycle: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "Metric collection timed out after {:?}, skipping cycle",
                    self.config.collection_timeout
                );
                None
            }
        };
        self.store.set_collecting(false);

        if let Some(outcome) = &outcome {
            debug!(
                "Collection cycle: {} collected, {} accepted, {} rejected",
                outcome.collected, outcome.accepted, outcome.rejected
            );
        }
        outcome
    }

    /// Re-analyses the key metrics over the recent window, re-scores impact and
    /// raises alerts for critical findings.
    #[instrument(skip(self))]
    pub async fn run_realtime_cycle(&self) -> RealtimeOutcome {
        let window = Timeframe::ending_at(Utc::now(), self.config.realtime_window);

        let mut insights: Vec<TrendInsight> = Vec::new();
        let mut series: HashMap<String, Vec<DataPoint>> = HashMap::new();
        for metric in &self.config.key_metrics {
            let points = match self.store.samples(metric, Some(window)).await {
                Ok(samples) if !samples.is_empty() => {
                    samples.iter().map(MetricSample::data_point).collect::<Vec<_>>()
                }
                _ => continue,
            };
            let kpi = self.store.kpi_definition(metric).await;
            insights.extend(
                self.analyzer
                    .analyze_trend(metric, &points, kpi.as_ref())
                    .await,
            );
            series.insert(metric.clone(), points);
        }
        if series.len() > 1 {
            self.analyzer.analyze_correlations(&series).await;
        }

        let quality = self.quality_snapshot(Some(window)).await;
        let business = self.business_snapshot(Some(window)).await;
        let assessment = self.scorer.assess(&quality, &business, &insights).await;

        let mut alerts_raised = 0;
        for insight in insights.iter().filter(|i| i.severity == Severity::Critical) {
            self.alerts.dispatch(&Alert::from_insight(insight));
            alerts_raised += 1;
        }
        for recommendation in assessment
            .recommendations
            .iter()
            .filter(|r| r.priority == Severity::Critical && r.source_metric.is_none())
        {
            self.alerts.dispatch(&Alert::from_recommendation(recommendation));
            alerts_raised += 1;
        }

        let outcome = RealtimeOutcome {
            metrics_analyzed: series.len(),
            insights: insights.len(),
            alerts_raised,
            overall_score: assessment.overall_score,
        };
        debug!("Real-time cycle: {:?}", outcome);
        outcome
    }

    async fn value_or(&self, metric: &str, timeframe: Option<Timeframe>, default: f64) -> f64 {
        self.store.aggregate(metric, timeframe).await.unwrap_or(default)
    }

    /// KPI values over the timeframe; missing series fall back to the baseline.
    pub async fn quality_snapshot(&self, timeframe: Option<Timeframe>) -> QualityMetrics {
        let d = QualityMetrics::default();
        QualityMetrics {
            test_pass_rate: self.value_or(ids::TEST_PASS_RATE, timeframe, d.test_pass_rate).await,
            code_coverage: self.value_or(ids::CODE_COVERAGE, timeframe, d.code_coverage).await,
            defect_escape_rate: self
                .value_or(ids::DEFECT_ESCAPE_RATE, timeframe, d.defect_escape_rate)
                .await,
            availability: self.value_or(ids::AVAILABILITY, timeframe, d.availability).await,
            response_time_ms: self
                .value_or(ids::RESPONSE_TIME, timeframe, d.response_time_ms)
                .await,
            error_rate: self.value_or(ids::ERROR_RATE, timeframe, d.error_rate).await,
            mean_time_to_recovery_minutes: self
                .value_or(
                    ids::MEAN_TIME_TO_RECOVERY,
                    timeframe,
                    d.mean_time_to_recovery_minutes,
                )
                .await,
            security_vulnerabilities: self
                .value_or(ids::SECURITY_VULNERABILITIES, timeframe, d.security_vulnerabilities)
                .await,
        }
    }

    pub async fn business_snapshot(&self, timeframe: Option<Timeframe>) -> BusinessMetrics {
        use business_ids::*;
        let d = BusinessMetrics::default();
        BusinessMetrics {
            user_satisfaction: self
                .value_or(ids::USER_SATISFACTION, timeframe, d.user_satisfaction)
                .await,
            task_completion_rate: self
                .value_or(ids::TASK_COMPLETION_RATE, timeframe, d.task_completion_rate)
                .await,
            error_recovery_rate: self
                .value_or(ERROR_RECOVERY_RATE, timeframe, d.error_recovery_rate)
                .await,
            accessibility_score: self
                .value_or(ACCESSIBILITY_SCORE, timeframe, d.accessibility_score)
                .await,
            incident_count: self.value_or(INCIDENT_COUNT, timeframe, d.incident_count).await,
            resource_utilization: self
                .value_or(RESOURCE_UTILIZATION, timeframe, d.resource_utilization)
                .await,
            maintenance_hours: self
                .value_or(MAINTENANCE_HOURS, timeframe, d.maintenance_hours)
                .await,
            defect_cost_avoidance: self
                .value_or(DEFECT_COST_AVOIDANCE, timeframe, d.defect_cost_avoidance)
                .await,
            time_to_market_days: self
                .value_or(TIME_TO_MARKET_DAYS, timeframe, d.time_to_market_days)
                .await,
            cost_per_feature: self
                .value_or(COST_PER_FEATURE, timeframe, d.cost_per_feature)
                .await,
            risk_reduction: self.value_or(RISK_REDUCTION, timeframe, d.risk_reduction).await,
            compliance_score: self
                .value_or(COMPLIANCE_SCORE, timeframe, d.compliance_score)
                .await,
        }
    }

    async fn current_assessment(&self, timeframe: Option<Timeframe>) -> (BusinessImpactAssessment, f64) {
        let quality = self.quality_snapshot(timeframe).await;
        let business = self.business_snapshot(timeframe).await;
        let insights = self.analyzer.all_insights().await;
        (
            self.scorer.evaluate(&quality, &business, &insights),
            health_score(&quality, &business),
        )
    }

    pub async fn dashboard(&self) -> Dashboard {
        let store_summary = self.store.summary().await;
        self.dashboard_from(&store_summary).await
    }

    async fn dashboard_from(&self, store_summary: &StoreSummary) -> Dashboard {
        let now = Utc::now();

        let mut kpis = Vec::new();
        for definition in self.store.kpis().await {
            let value = self.store.kpi_value(&definition.id, None).await.ok();
            kpis.push(KpiSnapshot {
                status: value
                    .map(|v| definition.status(v))
                    .unwrap_or("no_data")
                    .to_string(),
                id: definition.id,
                name: definition.name,
                category: definition.category,
                value,
                target: definition.target,
                unit: definition.unit,
            });
        }

        let mut insights = self.analyzer.all_insights().await;
        let critical_insights = insights
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count();
        insights.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
        });
        insights.truncate(DASHBOARD_INSIGHTS);

        let since = now - Duration::hours(24);
        let anomalies = self
            .analyzer
            .all_anomalies()
            .await
            .into_iter()
            .filter(|a| a.timestamp >= since)
            .take(DASHBOARD_ANOMALIES)
            .collect();

        let correlations = self
            .analyzer
            .correlations()
            .await
            .into_iter()
            .filter(|c| c.strength >= CorrelationStrength::Strong)
            .take(DASHBOARD_CORRELATIONS)
            .collect();

        let (impact, health_score) = self.current_assessment(None).await;

        Dashboard {
            summary: DashboardSummary {
                total_metrics: store_summary.total_samples,
                active_kpis: kpis.len(),
                critical_insights,
                health_score,
                last_updated: now,
            },
            kpis,
            insights,
            impact,
            anomalies,
            correlations,
            health_score,
        }
    }

    #[instrument(skip(self))]
    pub async fn report(
        &self,
        report_type: ReportType,
        period: Option<Timeframe>,
    ) -> Result<AnalyticsReport, DomainError> {
        let period = report_type.resolve_period(period, Utc::now())?;
        let (assessment, health_score) = self.current_assessment(Some(period)).await;

        let key_findings: Vec<String> = {
            let mut urgent: Vec<TrendInsight> = self
                .analyzer
                .all_insights()
                .await
                .into_iter()
                .filter(|i| i.severity.is_urgent())
                .collect();
            urgent.sort_by(|a, b| b.severity.cmp(&a.severity));
            urgent.into_iter().take(5).map(|i| i.title).collect()
        };
        let top_risks = assessment
            .recommendations
            .iter()
            .filter(|r| r.source_metric.is_none())
            .take(5)
            .map(|r| r.title.clone())
            .collect();

        let mut quality_trends = Vec::new();
        let previous_period = period.preceding();
        for metric in REPORTED_TRENDS {
            let current = self.store.aggregate(metric, Some(period)).await.ok();
            let previous = self.store.aggregate(metric, Some(previous_period)).await.ok();
            let change_percent = match (current, previous) {
                (Some(c), Some(p)) if p != 0.0 => Some((c - p) / p.abs() * 100.0),
                _ => None,
            };
            let points: Vec<DataPoint> = self
                .store
                .samples(metric, Some(period))
                .await
                .map(|s| s.iter().map(MetricSample::data_point).collect())
                .unwrap_or_default();
            let direction = self
                .store
                .kpi_definition(metric)
                .await
                .map(|k| k.direction)
                .unwrap_or_default();

            quality_trends.push(QualityTrend {
                metric: metric.to_string(),
                current,
                previous,
                change_percent,
                trend: self.analyzer.classify(&points, direction).trend,
            });
        }

        let mut response_times: Vec<f64> = self
            .store
            .samples(ids::RESPONSE_TIME, Some(period))
            .await
            .map(|s| s.iter().map(|s| s.value).collect())
            .unwrap_or_default();
        response_times.sort_by(f64::total_cmp);
        let performance = PerformanceAnalysis {
            average_response_time: stats::mean(&response_times),
            p95_response_time: stats::percentile(&response_times, 95.0),
            availability: self.store.aggregate(ids::AVAILABILITY, Some(period)).await.ok(),
            error_rate: self.store.aggregate(ids::ERROR_RATE, Some(period)).await.ok(),
            response_time_samples: response_times.len(),
        };

        let appendices = ReportAppendices {
            raw_data: self.store.points_by_metric(Some(period)).await,
            anomalies: self
                .analyzer
                .all_anomalies()
                .await
                .into_iter()
                .filter(|a| period.contains(a.timestamp))
                .collect(),
            correlations: self.analyzer.correlations().await,
        };

        info!("Generated {} report for {} .. {}", report_type, period.start, period.end);

        Ok(AnalyticsReport {
            id: Uuid::now_v7().to_string(),
            report_type,
            period,
            generated_at: Utc::now(),
            executive_summary: ExecutiveSummary {
                overall_score: assessment.overall_score,
                risk_level: assessment.risk_level,
                health_score,
                key_findings,
                top_risks,
            },
            quality_trends,
            performance,
            recommendations: assessment.recommendations,
            appendices,
        })
    }

    /// Trend view of one metric over the last `periods` units; also refreshes
    /// the stored findings for that metric.
    #[instrument(skip(self))]
    pub async fn trend_analysis(
        &self,
        metric: &str,
        unit: TimeUnit,
        periods: u32,
    ) -> Result<TrendData, DomainError> {
        if periods == 0 {
            return Err(DomainError::InvalidInput("periods must be at least 1".into()));
        }

        let points: Vec<DataPoint> = self
            .store
            .trend_window(metric, unit, periods)
            .await?
            .iter()
            .map(MetricSample::data_point)
            .collect();
        let kpi = self.store.kpi_definition(metric).await;

        self.analyzer
            .analyze_trend(metric, &points, kpi.as_ref())
            .await;

        let direction = kpi.map(|k| k.direction).unwrap_or_default();
        Ok(self
            .analyzer
            .trend_data(metric, unit, periods, points, direction))
    }

    pub async fn cost_benefit(&self, costs: &CostInputs) -> Result<CostBenefitAnalysis, DomainError> {
        self.scorer.cost_benefit(costs).await
    }

    pub async fn summary(&self) -> EngineSummary {
        let store_summary = self.store.summary().await;
        self.summary_from(&store_summary).await
    }

    async fn summary_from(&self, store_summary: &StoreSummary) -> EngineSummary {
        EngineSummary {
            metrics_collected: store_summary.total_samples,
            series_count: store_summary.series_count,
            kpis_defined: self.store.kpis().await.len(),
            insights_generated: self.analyzer.all_insights().await.len(),
            anomalies_detected: self.analyzer.all_anomalies().await.len(),
            last_collection: *self.last_collection.read().await,
            is_collecting: store_summary.collecting,
            initialized: self.is_initialized(),
        }
    }

    /// Dashboard and summary in the JSON bundle share one store snapshot.
    pub async fn export(&self, format: ExportFormat) -> anyhow::Result<ExportPayload> {
        let mut series = BTreeMap::new();
        for id in self.store.series_ids().await {
            if let Some(samples) = self.store.series(&id).await {
                series.insert(id, samples);
            }
        }

        let body = match format {
            ExportFormat::Csv => samples_to_csv(series.values().flatten()),
            ExportFormat::Json => {
                let store_summary = self.store.summary().await;
                let bundle = ExportBundle {
                    exported_at: Utc::now(),
                    dashboard: self.dashboard_from(&store_summary).await,
                    summary: self.summary_from(&store_summary).await,
                    series,
                    kpis: self.store.kpis().await,
                };
                serde_json::to_string_pretty(&bundle)?
            }
        };

        debug!("Exported {} bytes as {:?}", body.len(), format);
        Ok(ExportPayload { format, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::impact_scoring::config::ImpactConfig;
    use crate::application::trend_analysis::config::AnalyzerConfig;
    use crate::domain::metric::entity::MetricCategory;
    use crate::domain::metric::kpi::{KpiDirection, KpiThreshold};
    use crate::domain::metric::source::MockMetricSource;
    use std::sync::Mutex as StdMutex;

    fn orchestrator_with(source: impl MetricSource + 'static, config: OrchestratorConfig) -> Arc<AnalyticsOrchestrator> {
        Arc::new(AnalyticsOrchestrator::new(
            Arc::new(MetricStore::new()),
            Arc::new(TrendAnalyzer::new(AnalyzerConfig::default())),
            Arc::new(ImpactScorer::new(ImpactConfig::default()).unwrap()),
            Arc::new(AlertDispatcher::new()),
            Arc::new(source),
            config,
        ))
    }

    fn orchestrator(source: MockMetricSource) -> Arc<AnalyticsOrchestrator> {
        orchestrator_with(source, OrchestratorConfig::default())
    }

    fn idle_source() -> MockMetricSource {
        let mut source = MockMetricSource::new();
        source.expect_collect().returning(|| Ok(Vec::new()));
        source
    }

    fn sample(id: &str, value: f64, at: DateTime<Utc>) -> NewMetricSample {
        NewMetricSample::new(id, MetricCategory::Quality, value).at(at)
    }

    #[tokio::test]
    async fn collection_cycle_records_source_samples() {
        let mut source = MockMetricSource::new();
        source.expect_collect().times(1).returning(|| {
            Ok(vec![
                NewMetricSample::new("test_pass_rate", MetricCategory::Quality, 97.0),
                NewMetricSample::new("test_pass_rate", MetricCategory::Quality, f64::NAN),
            ])
        });
        let engine = orchestrator(source);

        let outcome = engine.run_collection_cycle().await.unwrap();
        assert_eq!(outcome.collected, 2);
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.rejected, 1);

        let summary = engine.summary().await;
        assert_eq!(summary.metrics_collected, 1);
        assert!(summary.last_collection.is_some());
        assert!(!summary.is_collecting);
    }

    #[tokio::test]
    async fn failing_source_skips_the_cycle() {
        let mut source = MockMetricSource::new();
        source
            .expect_collect()
            .returning(|| Err(anyhow::anyhow!("collector offline")));
        let engine = orchestrator(source);

        assert!(engine.run_collection_cycle().await.is_none());
        assert!(engine.run_collection_cycle().await.is_none());
        assert_eq!(engine.summary().await.last_collection, None);
    }

    struct HangingSource;

    #[async_trait::async_trait]
    impl MetricSource for HangingSource {
        async fn collect(&self) -> anyhow::Result<Vec<NewMetricSample>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn hanging_source_times_out() {
        let config = OrchestratorConfig {
            collection_timeout: std::time::Duration::from_millis(50),
            ..Default::default()
        };
        let engine = orchestrator_with(HangingSource, config);
        assert!(engine.run_collection_cycle().await.is_none());
        assert!(!engine.store().is_collecting());
    }

    #[tokio::test]
    async fn initialize_is_idempotent_and_shutdown_stops_loops() {
        let engine = orchestrator(idle_source());
        assert!(!engine.is_initialized());

        engine.initialize().await;
        engine.initialize().await;
        assert!(engine.is_initialized());
        assert_eq!(engine.lifecycle.lock().await.tasks.len(), 2);

        engine.shutdown().await;
        assert!(!engine.is_initialized());
        assert!(engine.lifecycle.lock().await.tasks.is_empty());

        engine.initialize().await;
        assert!(engine.is_initialized());
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn loops_do_not_keep_a_dropped_engine_alive() {
        let engine = orchestrator(idle_source());
        engine.initialize().await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let weak = Arc::downgrade(&engine);
        drop(engine);
        assert!(weak.upgrade().is_none());

        let (_tx, rx) = watch::channel(false);
        let worker = CollectionWorker::new(weak, std::time::Duration::from_millis(10));
        tokio::time::timeout(std::time::Duration::from_secs(1), worker.start(rx))
            .await
            .expect("collection loop ends once the engine is gone");
    }

    #[tokio::test]
    async fn realtime_loop_is_optional() {
        let config = OrchestratorConfig {
            enable_real_time_analysis: false,
            ..Default::default()
        };
        let engine = orchestrator_with(idle_source(), config);
        engine.initialize().await;
        assert_eq!(engine.lifecycle.lock().await.tasks.len(), 1);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn dashboard_before_initialize_is_empty_but_valid() {
        let engine = orchestrator(idle_source());
        let dashboard = engine.dashboard().await;

        assert_eq!(dashboard.summary.total_metrics, 0);
        assert!(dashboard.kpis.iter().all(|k| k.status == "no_data"));
        assert!(dashboard.insights.is_empty());
        assert!((0.0..=100.0).contains(&dashboard.health_score));
    }

    #[tokio::test]
    async fn realtime_cycle_alerts_on_critical_findings() {
        let engine = orchestrator(idle_source());
        let received = Arc::new(StdMutex::new(Vec::new()));
        let sink = received.clone();
        engine.on_alert(Arc::new(move |alert: &Alert| -> anyhow::Result<()> {
            sink.lock().unwrap().push(alert.clone());
            Ok(())
        }));

        let now = Utc::now();
        for minutes in [30, 20, 10] {
            engine
                .record_metric(sample("test_pass_rate", 50.0, now - Duration::minutes(minutes)))
                .await
                .unwrap();
        }

        let outcome = engine.run_realtime_cycle().await;
        assert_eq!(outcome.metrics_analyzed, 1);
        assert!(outcome.alerts_raised >= 1);

        let received = received.lock().unwrap();
        assert_eq!(received.len(), outcome.alerts_raised);
        assert!(
            received
                .iter()
                .any(|a| a.metric.as_deref() == Some("test_pass_rate"))
        );
        assert_eq!(engine.scorer().history().await.len(), 1);
    }

    #[tokio::test]
    async fn trend_analysis_reports_declining_series() {
        let engine = orchestrator(idle_source());
        let now = Utc::now();
        for i in 0..24 {
            engine
                .record_metric(sample(
                    "test_pass_rate",
                    100.0 - i as f64,
                    now - Duration::hours(23 - i) - Duration::minutes(1),
                ))
                .await
                .unwrap();
        }

        let trend = engine
            .trend_analysis("test_pass_rate", TimeUnit::Hour, 24)
            .await
            .unwrap();
        assert_eq!(trend.data_points.len(), 24);
        assert_eq!(trend.trend, crate::domain::analysis::entity::TrendDirection::Declining);
        assert!(trend.change_rate < 0.0);
        assert_eq!(trend.forecast.as_ref().map(|f| f.len()), Some(6));
        assert!(!engine.analyzer().insights("test_pass_rate").await.is_empty());

        assert!(matches!(
            engine.trend_analysis("unknown", TimeUnit::Hour, 24).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reports_cover_the_requested_period() {
        let engine = orchestrator(idle_source());
        let now = Utc::now();
        for (hours_ago, value) in [(30, 200.0), (5, 300.0), (2, 500.0)] {
            engine
                .record_metric(
                    NewMetricSample::new("response_time", MetricCategory::Performance, value)
                        .at(now - Duration::hours(hours_ago)),
                )
                .await
                .unwrap();
        }

        let report = engine.report(ReportType::Daily, None).await.unwrap();
        assert_eq!(report.performance.response_time_samples, 2);
        assert_eq!(report.performance.average_response_time, Some(400.0));
        assert_eq!(report.performance.p95_response_time, Some(500.0));

        let response = report
            .quality_trends
            .iter()
            .find(|t| t.metric == "response_time")
            .unwrap();
        assert_eq!(response.current, Some(400.0));
        assert_eq!(response.previous, Some(200.0));
        assert_eq!(response.change_percent, Some(100.0));
        assert_eq!(report.appendices.raw_data["response_time"].len(), 2);

        assert!(engine.report(ReportType::Custom, None).await.is_err());
    }

    #[tokio::test]
    async fn add_kpi_validates_and_replaces() {
        let engine = orchestrator(idle_source());
        let definition = KpiDefinition {
            id: "build_time".into(),
            name: "Build Time".into(),
            category: MetricCategory::Performance,
            formula: "wall clock minutes".into(),
            target: 10.0,
            threshold: KpiThreshold {
                critical: 30.0,
                warning: 20.0,
                good: 10.0,
            },
            unit: "min".into(),
            frequency: "per build".into(),
            direction: KpiDirection::LowerIsBetter,
        };
        engine.add_kpi(definition.clone()).await.unwrap();

        let broken = KpiDefinition {
            target: f64::NAN,
            ..definition
        };
        assert!(engine.add_kpi(broken).await.is_err());
        assert_eq!(
            engine
                .store()
                .kpi_definition("build_time")
                .await
                .unwrap()
                .target,
            10.0
        );
    }

    #[tokio::test]
    async fn json_export_matches_summary() {
        let engine = orchestrator(idle_source());
        engine
            .record_metric(NewMetricSample::new("availability", MetricCategory::Reliability, 99.95))
            .await
            .unwrap();

        let payload = engine.export(ExportFormat::Json).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload.body).unwrap();
        assert_eq!(
            parsed["dashboard"]["summary"]["total_metrics"],
            parsed["summary"]["metrics_collected"]
        );
        assert_eq!(parsed["summary"]["metrics_collected"], 1);

        let csv = engine.export(ExportFormat::Csv).await.unwrap();
        assert_eq!(csv.body.lines().count(), 2);
    }

    #[test]
    fn health_score_of_baseline_snapshots() {
        let score = health_score(&QualityMetrics::default(), &BusinessMetrics::default());
        assert!((score - 89.98).abs() < 1e-9);

        let terrible = QualityMetrics {
            test_pass_rate: -10.0,
            availability: 0.0,
            defect_escape_rate: 50.0,
            response_time_ms: 10_000.0,
            error_rate: 100.0,
            ..Default::default()
        };
        let unhappy = BusinessMetrics {
            user_satisfaction: 0.0,
            ..Default::default()
        };
        assert_eq!(health_score(&terrible, &unhappy), 0.0);
    }
}
