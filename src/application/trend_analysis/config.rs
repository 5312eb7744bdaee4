//! Configuration for the trend analyzer.

/// Thresholds driving trend classification, anomaly detection and pattern reporting
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Absolute z-score above which a point is an anomaly
    pub anomaly_z_threshold: f64,

    /// Minimum window size for anomaly detection
    pub min_anomaly_points: usize,

    /// Minimum samples a seasonal bucket needs before its average counts
    pub min_bucket_samples: usize,

    /// Coefficient of variation (percent) above which a series is volatile
    pub volatility_threshold_percent: f64,

    /// Half-over-half change (percent) that counts as improving or declining
    pub change_threshold_percent: f64,

    /// Seasonal patterns above this confidence become insights
    pub pattern_insight_confidence: f64,

    /// Pairs below this absolute coefficient are not retained
    pub min_correlation: f64,

    /// Minimum paired points for a correlation
    pub min_correlation_points: usize,

    /// Future points projected by a forecast
    pub forecast_periods: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            anomaly_z_threshold: 2.5,
            min_anomaly_points: 10,
            min_bucket_samples: 3,
            volatility_threshold_percent: 20.0,
            change_threshold_percent: 5.0,
            pattern_insight_confidence: 0.7,
            min_correlation: 0.3,
            min_correlation_points: 10,
            forecast_periods: 6,
        }
    }
}
