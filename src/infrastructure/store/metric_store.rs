//! Append-only, bounded-per-series storage for metric samples.
//!
//! Each series sits behind its own lock so the collection loop can append to one
//! metric while dashboards and reports read others. The outer map lock is only
//! held long enough to find or create a series handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use ts_rs::TS;

use super::aggregation::Aggregation;
use crate::domain::analysis::entity::DataPoint;
use crate::domain::metric::{
    entity::MetricSample,
    kpi::{KpiDefinition, default_kpis, ids},
    value_objects::{NewMetricSample, TimeUnit, Timeframe},
};
use crate::domain::shared::errors::DomainError;

/// Configuration for sample retention.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum samples retained per series; the oldest are evicted first
    pub max_samples_per_series: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_samples_per_series: 1000,
        }
    }
}

type Series = Arc<RwLock<VecDeque<MetricSample>>>;

/// Store-level counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreSummary {
    pub total_samples: usize,
    pub series_count: usize,
    pub last_sample_time: Option<DateTime<Utc>>,
    pub collecting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RejectedSample {
    pub index: usize,
    pub reason: String,
}

/// Result of a batch ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BatchOutcome {
    pub accepted: usize,
    pub rejected: Vec<RejectedSample>,
}

pub struct MetricStore {
    series: RwLock<HashMap<String, Series>>,
    kpis: RwLock<HashMap<String, KpiDefinition>>,
    aggregations: RwLock<HashMap<String, Aggregation>>,
    last_sample_time: RwLock<Option<DateTime<Utc>>>,
    collecting: AtomicBool,
    config: StoreConfig,
}

impl MetricStore {
    /// Creates a store with the default retention and KPI catalogue.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        info!("Initializing MetricStore with configuration: {:?}", config);

        let kpis = default_kpis()
            .into_iter()
            .map(|kpi| (kpi.id.clone(), kpi))
            .collect();

        let mut aggregations = HashMap::new();
        aggregations.insert(ids::CODE_COVERAGE.to_string(), Aggregation::Latest);
        aggregations.insert(
            ids::SECURITY_VULNERABILITIES.to_string(),
            Aggregation::Latest,
        );

        Self {
            series: RwLock::new(HashMap::new()),
            kpis: RwLock::new(kpis),
            aggregations: RwLock::new(aggregations),
            last_sample_time: RwLock::new(None),
            collecting: AtomicBool::new(false),
            config: StoreConfig {
                max_samples_per_series: config.max_samples_per_series.max(1),
            },
        }
    }

    pub fn max_samples_per_series(&self) -> usize {
        self.config.max_samples_per_series
    }

    /// Validates and appends a sample to the series keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` when the payload is malformed; the
    /// sample is dropped and nothing is stored.
    #[instrument(skip(self, sample), fields(metric = %sample.id))]
    pub async fn record(&self, sample: NewMetricSample) -> Result<MetricSample, DomainError> {
        let sample = sample.into_sample().inspect_err(|e| {
            warn!("Rejected metric sample: {}", e);
        })?;
        self.append(sample.clone()).await;
        Ok(sample)
    }

    /// Records every valid sample of a batch, reporting the rejected ones by index.
    pub async fn record_batch(&self, samples: Vec<NewMetricSample>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for (index, sample) in samples.into_iter().enumerate() {
            match self.record(sample).await {
                Ok(_) => outcome.accepted += 1,
                Err(e) => outcome.rejected.push(RejectedSample {
                    index,
                    reason: e.to_string(),
                }),
            }
        }
        outcome
    }

    async fn append(&self, sample: MetricSample) {
        let timestamp = sample.timestamp;
        let handle = self.series_handle(&sample.id).await;
        {
            let mut series = handle.write().await;
            series.push_back(sample);
            while series.len() > self.config.max_samples_per_series {
                if let Some(evicted) = series.pop_front() {
                    debug!("Evicted sample of {} recorded at {}", evicted.id, evicted.timestamp);
                }
            }
        }

        let mut last = self.last_sample_time.write().await;
        if last.is_none_or(|current| timestamp > current) {
            *last = Some(timestamp);
        }
    }

    async fn series_handle(&self, id: &str) -> Series {
        if let Some(handle) = self.series.read().await.get(id) {
            return handle.clone();
        }

        let mut series = self.series.write().await;
        series
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(VecDeque::new())))
            .clone()
    }

    async fn existing_series(&self, id: &str) -> Option<Series> {
        self.series.read().await.get(id).cloned()
    }

    /// Snapshot of a series, ascending by timestamp, optionally limited to a timeframe.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when no sample was ever recorded for `metric_id`.
    /// A known series with nothing in the window yields an empty vector.
    pub async fn samples(
        &self,
        metric_id: &str,
        timeframe: Option<Timeframe>,
    ) -> Result<Vec<MetricSample>, DomainError> {
        let handle = self
            .existing_series(metric_id)
            .await
            .ok_or_else(|| DomainError::NotFound(format!("metric '{}'", metric_id)))?;

        let mut samples: Vec<MetricSample> = {
            let series = handle.read().await;
            series
                .iter()
                .filter(|s| timeframe.is_none_or(|frame| frame.contains(s.timestamp)))
                .cloned()
                .collect()
        };
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }

    /// Samples within `periods` units before now, ascending by timestamp.
    pub async fn trend_window(
        &self,
        metric_id: &str,
        unit: TimeUnit,
        periods: u32,
    ) -> Result<Vec<MetricSample>, DomainError> {
        self.samples(metric_id, Some(Timeframe::last(unit, periods)))
            .await
    }

    /// Full retained series, ascending by timestamp.
    pub async fn series(&self, metric_id: &str) -> Option<Vec<MetricSample>> {
        self.samples(metric_id, None).await.ok()
    }

    pub async fn series_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.series.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Data points of every series within the timeframe, keyed by metric id.
    pub async fn points_by_metric(
        &self,
        timeframe: Option<Timeframe>,
    ) -> HashMap<String, Vec<DataPoint>> {
        let mut points = HashMap::new();
        for id in self.series_ids().await {
            if let Ok(samples) = self.samples(&id, timeframe).await {
                if !samples.is_empty() {
                    points.insert(id, samples.iter().map(MetricSample::data_point).collect());
                }
            }
        }
        points
    }

    /// Registers a KPI, replacing any definition with the same id.
    pub async fn add_kpi(&self, definition: KpiDefinition) {
        info!("Registering KPI {}", definition.id);
        self.kpis
            .write()
            .await
            .insert(definition.id.clone(), definition);
    }

    pub async fn kpi_definition(&self, kpi_id: &str) -> Option<KpiDefinition> {
        self.kpis.read().await.get(kpi_id).cloned()
    }

    pub async fn kpis(&self) -> Vec<KpiDefinition> {
        let mut kpis: Vec<KpiDefinition> = self.kpis.read().await.values().cloned().collect();
        kpis.sort_by(|a, b| a.id.cmp(&b.id));
        kpis
    }

    /// Overrides how a KPI window is reduced. Unregistered KPIs use the mean.
    pub async fn register_aggregation(&self, kpi_id: &str, aggregation: Aggregation) {
        self.aggregations
            .write()
            .await
            .insert(kpi_id.to_string(), aggregation);
    }

    /// Computes a KPI over its series, optionally restricted to a timeframe.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown KPI id or when the window
    /// holds no samples. Callers substitute their documented default.
    pub async fn kpi_value(
        &self,
        kpi_id: &str,
        timeframe: Option<Timeframe>,
    ) -> Result<f64, DomainError> {
        if self.kpi_definition(kpi_id).await.is_none() {
            return Err(DomainError::NotFound(format!("KPI '{}'", kpi_id)));
        }
        self.aggregate(kpi_id, timeframe).await
    }

    /// Reduces any series over a timeframe with its registered aggregation (mean
    /// unless overridden), whether or not a KPI is defined for it.
    pub async fn aggregate(
        &self,
        metric_id: &str,
        timeframe: Option<Timeframe>,
    ) -> Result<f64, DomainError> {
        let values: Vec<f64> = self
            .samples(metric_id, timeframe)
            .await?
            .into_iter()
            .map(|s| s.value)
            .collect();

        let aggregation = self
            .aggregations
            .read()
            .await
            .get(metric_id)
            .cloned()
            .unwrap_or_default();

        aggregation.apply(&values).ok_or_else(|| {
            DomainError::NotFound(format!("no samples for '{}' in window", metric_id))
        })
    }

    pub fn set_collecting(&self, collecting: bool) {
        self.collecting.store(collecting, Ordering::SeqCst);
    }

    pub fn is_collecting(&self) -> bool {
        self.collecting.load(Ordering::SeqCst)
    }

    pub async fn summary(&self) -> StoreSummary {
        let handles: Vec<Series> = self.series.read().await.values().cloned().collect();
        let mut total_samples = 0;
        for handle in &handles {
            total_samples += handle.read().await.len();
        }

        StoreSummary {
            total_samples,
            series_count: handles.len(),
            last_sample_time: *self.last_sample_time.read().await,
            collecting: self.is_collecting(),
        }
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}
