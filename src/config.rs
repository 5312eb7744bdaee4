//! Application configuration loading from environment variables.
//!
//! All configuration is read once at startup; `.env` files are honoured through `dotenvy`
//! in `main`. Every variable is optional.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (default: "info,quality_analytics=debug,tower_http=debug")
//! - `HOST`: Server bind address (default: "0.0.0.0")
//! - `PORT`: Server port (default: 3000)
//! - `COLLECTION_INTERVAL_SECONDS`: Collection loop period (default: 60)
//! - `ENABLE_REAL_TIME_ANALYSIS`: Run the real-time analysis loop (default: true)
//! - `COLLECTION_TIMEOUT_SECONDS`: Deadline for one source call (default: 30)
//! - `MAX_SAMPLES_PER_SERIES`: Retained samples per metric series (default: 1000)
//! - `REALTIME_WINDOW_HOURS`: Window analysed by the real-time loop (default: 1)
//! - `FORECAST_PERIODS`: Forecast horizon of trend analysis (default: 6)
//! - `ANNUAL_REVENUE_BASELINE`: Revenue baseline for projections (default: 10000000)
//! - `ASSESSMENT_HISTORY_LIMIT`: Retained impact assessments (default: 100)
//! - `SAMPLE_QUEUE_CAPACITY`: Pending samples accepted for collection (default: 10000)

use std::time::Duration;

use crate::application::analytics::config::OrchestratorConfig;
use crate::application::impact_scoring::config::ImpactConfig;
use crate::application::trend_analysis::config::AnalyzerConfig;
use crate::infrastructure::store::metric_store::StoreConfig;

/// Complete server configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Seconds between collection cycles; the real-time loop runs every fifth
    pub collection_interval_seconds: u64,

    pub enable_real_time_analysis: bool,

    /// Seconds one metric source call may take before the cycle is skipped
    pub collection_timeout_seconds: u64,

    /// FIFO cap of each metric series
    pub max_samples_per_series: usize,

    /// Hours of recent data the real-time loop analyses
    pub realtime_window_hours: i64,

    pub forecast_periods: u32,

    /// Annual revenue used to express impact in currency
    pub annual_revenue_baseline: f64,

    pub assessment_history_limit: usize,

    /// Maximum samples waiting in the ingestion queue
    pub sample_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            collection_interval_seconds: 60,
            enable_real_time_analysis: true,
            collection_timeout_seconds: 30,
            max_samples_per_series: 1000,
            realtime_window_hours: 1,
            forecast_periods: 6,
            annual_revenue_baseline: 10_000_000.0,
            assessment_history_limit: 100,
            sample_queue_capacity: 10_000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed to the expected type.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env_or("HOST", defaults.host)?,
            port: env_or("PORT", defaults.port)?,
            collection_interval_seconds: env_or(
                "COLLECTION_INTERVAL_SECONDS",
                defaults.collection_interval_seconds,
            )?,
            enable_real_time_analysis: env_or(
                "ENABLE_REAL_TIME_ANALYSIS",
                defaults.enable_real_time_analysis,
            )?,
            collection_timeout_seconds: env_or(
                "COLLECTION_TIMEOUT_SECONDS",
                defaults.collection_timeout_seconds,
            )?,
            max_samples_per_series: env_or(
                "MAX_SAMPLES_PER_SERIES",
                defaults.max_samples_per_series,
            )?,
            realtime_window_hours: env_or("REALTIME_WINDOW_HOURS", defaults.realtime_window_hours)?,
            forecast_periods: env_or("FORECAST_PERIODS", defaults.forecast_periods)?,
            annual_revenue_baseline: env_or(
                "ANNUAL_REVENUE_BASELINE",
                defaults.annual_revenue_baseline,
            )?,
            assessment_history_limit: env_or(
                "ASSESSMENT_HISTORY_LIMIT",
                defaults.assessment_history_limit,
            )?,
            sample_queue_capacity: env_or("SAMPLE_QUEUE_CAPACITY", defaults.sample_queue_capacity)?,
        })
    }

    pub fn store(&self) -> StoreConfig {
        StoreConfig {
            max_samples_per_series: self.max_samples_per_series.max(1),
        }
    }

    pub fn analyzer(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            forecast_periods: self.forecast_periods,
            ..AnalyzerConfig::default()
        }
    }

    pub fn impact(&self) -> ImpactConfig {
        ImpactConfig {
            revenue_baseline: self.annual_revenue_baseline,
            history_limit: self.assessment_history_limit,
            ..ImpactConfig::default()
        }
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            collection_interval: Duration::from_secs(self.collection_interval_seconds.max(1)),
            enable_real_time_analysis: self.enable_real_time_analysis,
            collection_timeout: Duration::from_secs(self.collection_timeout_seconds.max(1)),
            realtime_window: chrono::Duration::hours(self.realtime_window_hours.max(1)),
            ..OrchestratorConfig::default()
        }
    }
}

/// Load an environment variable with a default value.
///
/// # Errors
///
/// Returns an error if the variable is set but cannot be parsed.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => parse_var(key, &val),
        Err(_) => Ok(default),
    }
}

fn parse_var<T>(key: &str, val: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    val.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", key, e))
}
