//! Statistical analysis over metric windows.
//!
//! Every analysis of a metric replaces that metric's previously stored findings.
//! History is intentionally not accumulated: readers always see the most recent
//! analysis. Findings for one metric sit behind their own lock so analyses of
//! different metrics never contend.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use ts_rs::TS;
use uuid::Uuid;

use super::config::AnalyzerConfig;
use super::stats;
use crate::domain::analysis::entity::{
    AnomalyDetection, AnomalyType, CorrelationAnalysis, CorrelationDirection, CorrelationStrength,
    DataPoint, ForecastPoint, InsightData, InsightType, PatternKind, SeasonalPattern,
    TrendData, TrendDirection, TrendInsight,
};
use crate::domain::metric::kpi::{KpiDefinition, KpiDirection};
use crate::domain::metric::value_objects::{TimeUnit, Timeframe};
use crate::domain::shared::severity::Severity;

/// Outcome of classifying a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendClassification {
    pub trend: TrendDirection,
    /// Percent change of the second-half average over the first-half average
    pub change_percent: f64,
    /// Coefficient of variation in percent
    pub volatility: f64,
    pub first_half_average: f64,
    pub second_half_average: f64,
}

#[derive(Debug, Clone, Default)]
struct MetricFindings {
    insights: Vec<TrendInsight>,
    anomalies: Vec<AnomalyDetection>,
    patterns: Vec<SeasonalPattern>,
}

type Findings = Arc<RwLock<MetricFindings>>;

struct SeasonalPass {
    kind: PatternKind,
    space: usize,
    coverage: usize,
    first_label: u32,
    bucket: fn(&DateTime<Utc>) -> usize,
}

const SEASONAL_PASSES: [SeasonalPass; 4] = [
    SeasonalPass {
        kind: PatternKind::Daily,
        space: 24,
        coverage: 12,
        first_label: 0,
        bucket: |t| t.hour() as usize,
    },
    SeasonalPass {
        kind: PatternKind::Weekly,
        space: 7,
        coverage: 5,
        first_label: 0,
        bucket: |t| t.weekday().num_days_from_sunday() as usize,
    },
    SeasonalPass {
        kind: PatternKind::Monthly,
        space: 31,
        coverage: 15,
        first_label: 1,
        bucket: |t| t.day0() as usize,
    },
    SeasonalPass {
        kind: PatternKind::Quarterly,
        space: 3,
        coverage: 3,
        first_label: 0,
        bucket: |t| (t.month0() % 3) as usize,
    },
];

pub struct TrendAnalyzer {
    findings: RwLock<HashMap<String, Findings>>,
    correlations: RwLock<HashMap<(String, String), CorrelationAnalysis>>,
    config: AnalyzerConfig,
}

impl TrendAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        info!("Initializing TrendAnalyzer with configuration: {:?}", config);
        Self {
            findings: RwLock::new(HashMap::new()),
            correlations: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Classifies a window where larger values are better.
    pub fn calculate_trend(&self, points: &[DataPoint]) -> TrendClassification {
        self.classify(points, KpiDirection::HigherIsBetter)
    }

    /// Classifies a window; for lower-is-better series a rising average is a decline.
    ///
    /// Windows with fewer than two points are stable with zero change and volatility.
    pub fn classify(&self, points: &[DataPoint], direction: KpiDirection) -> TrendClassification {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        if values.len() < 2 {
            let only = values.first().copied().unwrap_or(0.0);
            return TrendClassification {
                trend: TrendDirection::Stable,
                change_percent: 0.0,
                volatility: 0.0,
                first_half_average: only,
                second_half_average: only,
            };
        }

        let (first, second) = values.split_at(values.len() / 2);
        let first_avg = stats::mean(first).unwrap_or(0.0);
        let second_avg = stats::mean(second).unwrap_or(0.0);
        let change_percent = percent_change(first_avg, second_avg);
        let volatility = stats::coefficient_of_variation(&values);

        let signed_change = match direction {
            KpiDirection::HigherIsBetter => change_percent,
            KpiDirection::LowerIsBetter => -change_percent,
        };

        let trend = if volatility > self.config.volatility_threshold_percent {
            TrendDirection::Volatile
        } else if signed_change > self.config.change_threshold_percent {
            TrendDirection::Improving
        } else if signed_change < -self.config.change_threshold_percent {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };

        TrendClassification {
            trend,
            change_percent,
            volatility,
            first_half_average: first_avg,
            second_half_average: second_avg,
        }
    }

    /// Builds the trend view returned by trend-analysis requests.
    pub fn trend_data(
        &self,
        metric: &str,
        unit: TimeUnit,
        periods: u32,
        points: Vec<DataPoint>,
        direction: KpiDirection,
    ) -> TrendData {
        let classification = self.classify(&points, direction);
        let forecast = self.forecast(&points, self.config.forecast_periods);

        TrendData {
            metric: metric.to_string(),
            timeframe: unit,
            periods,
            data_points: points,
            trend: classification.trend,
            change_rate: classification.change_percent,
            volatility: classification.volatility,
            forecast: (!forecast.is_empty()).then_some(forecast),
        }
    }

    /// Runs every single-metric analysis over `points` and stores the results,
    /// replacing whatever was stored for `metric` before.
    ///
    /// Returns the insights produced. Analyses that lack data (too few points,
    /// zero variance) contribute nothing without affecting the others.
    #[instrument(skip(self, points, kpi), fields(points = points.len()))]
    pub async fn analyze_trend(
        &self,
        metric: &str,
        points: &[DataPoint],
        kpi: Option<&KpiDefinition>,
    ) -> Vec<TrendInsight> {
        let mut window = points.to_vec();
        window.sort_by_key(|p| p.timestamp);

        let mut insights = Vec::new();
        if let Some(insight) = self.trend_insight(metric, &window, kpi) {
            insights.push(insight);
        }

        let anomalies = self.detect_anomalies(metric, &window);
        insights.extend(
            anomalies
                .iter()
                .filter(|a| a.severity.is_urgent())
                .map(|a| anomaly_insight(a, &window)),
        );

        let patterns = self.detect_seasonal_patterns(metric, &window);
        insights.extend(
            patterns
                .iter()
                .filter(|p| p.confidence > self.config.pattern_insight_confidence)
                .map(|p| pattern_insight(p, &window)),
        );

        if let Some(kpi) = kpi {
            if let Some(insight) = self.forecast_insight(metric, &window, kpi) {
                insights.push(insight);
            }
        }

        debug!(
            "Analyzed {}: {} insights, {} anomalies, {} patterns",
            metric,
            insights.len(),
            anomalies.len(),
            patterns.len()
        );

        let handle = self.findings_handle(metric).await;
        *handle.write().await = MetricFindings {
            insights: insights.clone(),
            anomalies,
            patterns,
        };

        insights
    }

    fn trend_insight(
        &self,
        metric: &str,
        window: &[DataPoint],
        kpi: Option<&KpiDefinition>,
    ) -> Option<TrendInsight> {
        let latest = window.last()?;
        let direction = kpi.map(|k| k.direction).unwrap_or_default();
        let classification = self.classify(window, direction);
        let change = classification.change_percent;

        let severity = match kpi {
            Some(kpi) => kpi.severity_for(latest.value),
            None => severity_from_change(change),
        };

        let insight_type = match classification.trend {
            TrendDirection::Improving => InsightType::Improvement,
            TrendDirection::Declining => InsightType::Degradation,
            TrendDirection::Volatile => InsightType::Anomaly,
            TrendDirection::Stable if severity.is_urgent() => InsightType::Degradation,
            TrendDirection::Stable => InsightType::Pattern,
        };

        let label = kpi.map(|k| k.name.as_str()).unwrap_or(metric);
        let (title, recommendation) = match classification.trend {
            TrendDirection::Improving => (
                format!("{} is improving", label),
                "Capture what changed recently and keep the practices that drove it.".to_string(),
            ),
            TrendDirection::Declining => (
                format!("{} is declining", label),
                "Review recent changes affecting this metric and plan corrective work.".to_string(),
            ),
            TrendDirection::Volatile => (
                format!("{} is volatile", label),
                "Investigate sources of instability before relying on this metric.".to_string(),
            ),
            TrendDirection::Stable if severity.is_urgent() => (
                format!("{} is stable outside its target band", label),
                "The metric is not recovering on its own; prioritise remediation.".to_string(),
            ),
            TrendDirection::Stable => (
                format!("{} is stable", label),
                "No action needed; keep monitoring.".to_string(),
            ),
        };

        Some(TrendInsight {
            id: Uuid::now_v7().to_string(),
            metric: metric.to_string(),
            insight_type,
            severity,
            title,
            description: format!(
                "Average moved from {:.2} to {:.2} ({:+.1}%) across {} samples; volatility {:.1}%.",
                classification.first_half_average,
                classification.second_half_average,
                change,
                window.len(),
                classification.volatility
            ),
            recommendation,
            confidence: (change.abs() / 100.0).min(0.95),
            detected_at: Utc::now(),
            affected_timeframe: window_timeframe(window),
            data: InsightData {
                current_value: latest.value,
                previous_value: (window.len() > 1).then_some(classification.first_half_average),
                change_percent: change,
                threshold: kpi.map(|k| k.threshold.warning),
            },
        })
    }

    /// Flags points whose population z-score exceeds the anomaly threshold.
    ///
    /// Returns anomalies newest first; empty for windows below the minimum size
    /// or with zero variance.
    pub fn detect_anomalies(&self, metric: &str, points: &[DataPoint]) -> Vec<AnomalyDetection> {
        if points.len() < self.config.min_anomaly_points {
            return Vec::new();
        }

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let (Some(mean), Some(sd)) = (stats::mean(&values), stats::std_dev(&values)) else {
            return Vec::new();
        };
        if sd == 0.0 {
            return Vec::new();
        }

        let mut anomalies: Vec<AnomalyDetection> = points
            .iter()
            .filter_map(|point| {
                let z = (point.value - mean).abs() / sd;
                let severity = if z > 4.0 {
                    Severity::Critical
                } else if z > 3.0 {
                    Severity::High
                } else if z > self.config.anomaly_z_threshold {
                    Severity::Medium
                } else {
                    return None;
                };

                Some(AnomalyDetection {
                    metric: metric.to_string(),
                    timestamp: point.timestamp,
                    value: point.value,
                    expected_value: mean,
                    deviation: z,
                    severity,
                    anomaly_type: if point.value > mean {
                        AnomalyType::Spike
                    } else {
                        AnomalyType::Drop
                    },
                })
            })
            .collect();

        anomalies.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        anomalies
    }

    /// Hour-of-day, day-of-week, day-of-month and month-of-quarter passes.
    pub fn detect_seasonal_patterns(
        &self,
        metric: &str,
        points: &[DataPoint],
    ) -> Vec<SeasonalPattern> {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let Some(mean) = stats::mean(&values) else {
            return Vec::new();
        };

        SEASONAL_PASSES
            .iter()
            .filter_map(|pass| self.seasonal_pass(metric, points, mean, pass))
            .collect()
    }

    fn seasonal_pass(
        &self,
        metric: &str,
        points: &[DataPoint],
        mean: f64,
        pass: &SeasonalPass,
    ) -> Option<SeasonalPattern> {
        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); pass.space];
        for point in points {
            buckets[(pass.bucket)(&point.timestamp)].push(point.value);
        }

        let averages: Vec<(u32, f64)> = buckets
            .iter()
            .enumerate()
            .filter(|(_, values)| values.len() >= self.config.min_bucket_samples)
            .filter_map(|(i, values)| Some((i as u32 + pass.first_label, stats::mean(values)?)))
            .collect();

        if averages.len() < pass.coverage {
            return None;
        }

        let max = averages.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
        let min = averages.iter().map(|(_, v)| *v).fold(f64::MAX, f64::min);
        let amplitude = max - min;
        if amplitude <= 0.0 {
            return None;
        }

        let band = 0.2 * amplitude;
        let peaks: Vec<u32> = averages
            .iter()
            .filter(|(_, avg)| *avg > mean + band)
            .map(|(label, _)| *label)
            .collect();
        let valleys: Vec<u32> = averages
            .iter()
            .filter(|(_, avg)| *avg < mean - band)
            .map(|(label, _)| *label)
            .collect();

        let confidence = ((peaks.len() + valleys.len()) as f64 / pass.space as f64).min(0.95);

        Some(SeasonalPattern {
            metric: metric.to_string(),
            pattern: pass.kind,
            peaks,
            valleys,
            amplitude,
            confidence,
        })
    }

    /// Least-squares projection of `periods` future points at the window's cadence.
    ///
    /// Empty for fewer than two points.
    pub fn forecast(&self, points: &[DataPoint], periods: u32) -> Vec<ForecastPoint> {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let Some((slope, intercept)) = stats::linear_regression(&values) else {
            return Vec::new();
        };
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Vec::new();
        };

        let gaps = i32::try_from(points.len() - 1).unwrap_or(i32::MAX);
        let mut cadence = (last.timestamp - first.timestamp) / gaps;
        if cadence <= Duration::zero() {
            cadence = Duration::hours(1);
        }

        // Stops at the end of the representable calendar.
        let last_index = (points.len() - 1) as f64;
        (1..=periods)
            .map_while(|step| {
                let offset = cadence.checked_mul(i32::try_from(step).ok()?)?;
                Some(ForecastPoint {
                    timestamp: last.timestamp.checked_add_signed(offset)?,
                    predicted_value: (intercept + slope * (last_index + step as f64)).max(0.0),
                    confidence: (1.0 - step as f64 * 0.1).max(0.5),
                })
            })
            .collect()
    }

    fn forecast_insight(
        &self,
        metric: &str,
        window: &[DataPoint],
        kpi: &KpiDefinition,
    ) -> Option<TrendInsight> {
        let forecast = self.forecast(window, self.config.forecast_periods);
        let first_breach = forecast
            .iter()
            .find(|p| kpi.violates_warning(p.predicted_value))?;
        let critical = forecast
            .iter()
            .any(|p| kpi.violates_critical(p.predicted_value));
        let latest = window.last()?;

        Some(TrendInsight {
            id: Uuid::now_v7().to_string(),
            metric: metric.to_string(),
            insight_type: InsightType::Forecast,
            severity: if critical {
                Severity::Critical
            } else {
                Severity::High
            },
            title: format!("{} forecast to breach its warning threshold", kpi.name),
            description: format!(
                "Projected to reach {:.2}{} by {}, against a warning threshold of {}{}.",
                first_breach.predicted_value,
                kpi.unit,
                first_breach.timestamp.format("%Y-%m-%d %H:%M UTC"),
                kpi.threshold.warning,
                kpi.unit
            ),
            recommendation: "Act before the projected breach; review the drivers of the current trend."
                .to_string(),
            confidence: first_breach.confidence,
            detected_at: Utc::now(),
            affected_timeframe: forecast
                .last()
                .map(|end| Timeframe {
                    start: latest.timestamp,
                    end: end.timestamp,
                }),
            data: InsightData {
                current_value: latest.value,
                previous_value: None,
                change_percent: percent_change(latest.value, first_breach.predicted_value),
                threshold: Some(kpi.threshold.warning),
            },
        })
    }

    /// Pearson correlation of two series, index-aligned on their most recent points.
    ///
    /// `None` when either series is shorter than the minimum or has zero variance.
    pub fn correlate(
        &self,
        metric1: &str,
        series1: &[DataPoint],
        metric2: &str,
        series2: &[DataPoint],
    ) -> Option<CorrelationAnalysis> {
        let n = series1.len().min(series2.len());
        if n < self.config.min_correlation_points {
            return None;
        }

        let xs: Vec<f64> = series1[series1.len() - n..].iter().map(|p| p.value).collect();
        let ys: Vec<f64> = series2[series2.len() - n..].iter().map(|p| p.value).collect();
        let r = stats::pearson(&xs, &ys)?;

        Some(CorrelationAnalysis {
            metric1: metric1.to_string(),
            metric2: metric2.to_string(),
            correlation: r,
            strength: CorrelationStrength::from_coefficient(r),
            direction: if r >= 0.0 {
                CorrelationDirection::Positive
            } else {
                CorrelationDirection::Negative
            },
            significance: significance(r, n),
        })
    }

    /// Correlates every unordered pair of the given series and stores the pairs
    /// at or above the minimum coefficient.
    ///
    /// Every stored pair touching one of the given metrics is discarded first, including
    /// pairs whose other metric is not part of this batch.
    #[instrument(skip(self, series), fields(metrics = series.len()))]
    pub async fn analyze_correlations(
        &self,
        series: &HashMap<String, Vec<DataPoint>>,
    ) -> Vec<CorrelationAnalysis> {
        let mut metrics: Vec<&String> = series.keys().collect();
        metrics.sort();

        let mut retained = Vec::new();
        for (i, first) in metrics.iter().enumerate() {
            for second in &metrics[i + 1..] {
                if let Some(analysis) =
                    self.correlate(first, &series[*first], second, &series[*second])
                {
                    if analysis.correlation.abs() >= self.config.min_correlation {
                        retained.push(analysis);
                    }
                }
            }
        }

        let mut stored = self.correlations.write().await;
        stored.retain(|(a, b), _| !series.contains_key(a) && !series.contains_key(b));
        for analysis in &retained {
            stored.insert(
                (analysis.metric1.clone(), analysis.metric2.clone()),
                analysis.clone(),
            );
        }

        debug!("Retained {} correlations", retained.len());
        retained
    }

    async fn findings_handle(&self, metric: &str) -> Findings {
        if let Some(handle) = self.findings.read().await.get(metric) {
            return handle.clone();
        }
        self.findings
            .write()
            .await
            .entry(metric.to_string())
            .or_default()
            .clone()
    }

    async fn existing(&self, metric: &str) -> Option<Findings> {
        self.findings.read().await.get(metric).cloned()
    }

    async fn handles(&self) -> Vec<Findings> {
        self.findings.read().await.values().cloned().collect()
    }

    pub async fn insights(&self, metric: &str) -> Vec<TrendInsight> {
        match self.existing(metric).await {
            Some(handle) => handle.read().await.insights.clone(),
            None => Vec::new(),
        }
    }

    pub async fn all_insights(&self) -> Vec<TrendInsight> {
        let mut all = Vec::new();
        for handle in self.handles().await {
            all.extend(handle.read().await.insights.iter().cloned());
        }
        all
    }

    /// Anomalies for one metric, newest first.
    pub async fn anomalies(&self, metric: &str) -> Vec<AnomalyDetection> {
        match self.existing(metric).await {
            Some(handle) => handle.read().await.anomalies.clone(),
            None => Vec::new(),
        }
    }

    /// Anomalies across all metrics, newest first.
    pub async fn all_anomalies(&self) -> Vec<AnomalyDetection> {
        let mut all = Vec::new();
        for handle in self.handles().await {
            all.extend(handle.read().await.anomalies.iter().cloned());
        }
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all
    }

    pub async fn patterns(&self, metric: &str) -> Vec<SeasonalPattern> {
        match self.existing(metric).await {
            Some(handle) => handle.read().await.patterns.clone(),
            None => Vec::new(),
        }
    }

    /// Stored correlations, strongest first.
    pub async fn correlations(&self) -> Vec<CorrelationAnalysis> {
        let mut all: Vec<CorrelationAnalysis> =
            self.correlations.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.correlation.abs().total_cmp(&a.correlation.abs()));
        all
    }

    /// Drops every stored finding for `metric`, including correlations it takes part in.
    pub async fn clear(&self, metric: &str) {
        self.findings.write().await.remove(metric);
        self.correlations
            .write()
            .await
            .retain(|_, analysis| !analysis.involves(metric));
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

/// `(to - from) / from * 100`, signed by the baseline. A zero baseline yields `0`
/// when nothing moved and `±100` otherwise.
fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        if to == 0.0 { 0.0 } else { 100.0 * to.signum() }
    } else {
        (to - from) / from * 100.0
    }
}

fn severity_from_change(change_percent: f64) -> Severity {
    let magnitude = change_percent.abs();
    if magnitude > 50.0 {
        Severity::Critical
    } else if magnitude > 25.0 {
        Severity::High
    } else if magnitude > 10.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// `|t| / (1 + |t|)` with `t = r * sqrt((n - 2) / (1 - r^2))`.
fn significance(r: f64, n: usize) -> f64 {
    let denominator = 1.0 - r * r;
    if denominator <= f64::EPSILON {
        return 1.0;
    }
    let t = (r * ((n as f64 - 2.0) / denominator).sqrt()).abs();
    t / (1.0 + t)
}

fn window_timeframe(window: &[DataPoint]) -> Option<Timeframe> {
    Some(Timeframe {
        start: window.first()?.timestamp,
        end: window.last()?.timestamp,
    })
}

fn anomaly_insight(anomaly: &AnomalyDetection, window: &[DataPoint]) -> TrendInsight {
    let kind = match anomaly.anomaly_type {
        AnomalyType::Spike => "spike",
        AnomalyType::Drop => "drop",
        AnomalyType::Drift => "drift",
        AnomalyType::Outlier => "outlier",
    };

    TrendInsight {
        id: Uuid::now_v7().to_string(),
        metric: anomaly.metric.clone(),
        insight_type: InsightType::Anomaly,
        severity: anomaly.severity,
        title: format!("Anomalous {} in {}", kind, anomaly.metric),
        description: format!(
            "Observed {:.2} at {} against an expected {:.2} (z = {:.2}).",
            anomaly.value,
            anomaly.timestamp.format("%Y-%m-%d %H:%M UTC"),
            anomaly.expected_value,
            anomaly.deviation
        ),
        recommendation: "Correlate with deployments and incidents around this time.".to_string(),
        confidence: (anomaly.deviation / 5.0).min(0.95),
        detected_at: Utc::now(),
        affected_timeframe: window_timeframe(window),
        data: InsightData {
            current_value: anomaly.value,
            previous_value: Some(anomaly.expected_value),
            change_percent: percent_change(anomaly.expected_value, anomaly.value),
            threshold: None,
        },
    }
}

fn pattern_insight(pattern: &SeasonalPattern, window: &[DataPoint]) -> TrendInsight {
    let current = window.last().map(|p| p.value).unwrap_or(0.0);
    TrendInsight {
        id: Uuid::now_v7().to_string(),
        metric: pattern.metric.clone(),
        insight_type: InsightType::Pattern,
        severity: Severity::Low,
        title: format!("{} pattern in {}", pattern.pattern.as_str(), pattern.metric),
        description: format!(
            "Peaks at {:?}, valleys at {:?}, amplitude {:.2}.",
            pattern.peaks, pattern.valleys, pattern.amplitude
        ),
        recommendation: "Schedule capacity and releases around the recurring peaks.".to_string(),
        confidence: pattern.confidence,
        detected_at: Utc::now(),
        affected_timeframe: window_timeframe(window),
        data: InsightData {
            current_value: current,
            previous_value: None,
            change_percent: 0.0,
            threshold: None,
        },
    }
}
