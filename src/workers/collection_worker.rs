use std::sync::Weak;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::application::analytics::orchestrator::AnalyticsOrchestrator;

/// Pulls samples from the metric source on a fixed interval.
///
/// Holds the engine weakly; the loop ends once the engine is dropped.
pub struct CollectionWorker {
    engine: Weak<AnalyticsOrchestrator>,
    interval: Duration,
}

impl CollectionWorker {
    pub fn new(engine: Weak<AnalyticsOrchestrator>, interval: Duration) -> Self {
        Self {
            engine,
            interval: interval.max(Duration::from_millis(10)),
        }
    }

    /// Runs until `shutdown` flips to `true`, its sender is dropped, or the engine is gone.
    pub async fn start(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Collection loop started ({:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(engine) = self.engine.upgrade() else {
                        break;
                    };
                    if let Some(outcome) = engine.run_collection_cycle().await {
                        debug!("Collected {} samples", outcome.accepted);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Collection loop stopped");
    }
}
