//! Scheduling configuration for the analytics orchestrator.

use std::time::Duration;

use crate::domain::metric::kpi::ids;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Period of the collection loop
    pub collection_interval: Duration,

    /// Run the real-time analysis loop (every 5 collection intervals)
    pub enable_real_time_analysis: bool,

    /// A source call exceeding this counts as a failed cycle
    pub collection_timeout: Duration,

    /// Recent window the real-time loop analyses
    pub realtime_window: chrono::Duration,

    /// Metrics the real-time loop re-analyses each cycle
    pub key_metrics: Vec<String>,
}

impl OrchestratorConfig {
    pub fn realtime_interval(&self) -> Duration {
        self.collection_interval * 5
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            collection_interval: Duration::from_secs(60),
            enable_real_time_analysis: true,
            collection_timeout: Duration::from_secs(30),
            realtime_window: chrono::Duration::hours(1),
            key_metrics: [
                ids::TEST_PASS_RATE,
                ids::RESPONSE_TIME,
                ids::ERROR_RATE,
                ids::AVAILABILITY,
                ids::USER_SATISFACTION,
            ]
            .iter()
            .map(|id| id.to_string())
            .collect(),
        }
    }
}
