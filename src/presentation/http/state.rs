use crate::{
    application::analytics::orchestrator::AnalyticsOrchestrator, config::Config,
    infrastructure::queue::sample_queue::SampleQueue,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalyticsOrchestrator>,
    /// Drained by the collection loop
    pub queue: Arc<SampleQueue>,
    pub config: Config,
}
