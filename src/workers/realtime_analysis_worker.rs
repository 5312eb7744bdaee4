use std::sync::Weak;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::application::analytics::orchestrator::AnalyticsOrchestrator;

/// Re-analyses the key metrics and re-scores impact on a fixed interval.
pub struct RealtimeAnalysisWorker {
    engine: Weak<AnalyticsOrchestrator>,
    interval: Duration,
}

impl RealtimeAnalysisWorker {
    pub fn new(engine: Weak<AnalyticsOrchestrator>, interval: Duration) -> Self {
        Self {
            engine,
            interval: interval.max(Duration::from_millis(10)),
        }
    }

    pub async fn start(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; let a collection cycle land first.
        ticker.tick().await;
        info!("Real-time analysis loop started ({:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(engine) = self.engine.upgrade() else {
                        break;
                    };
                    let outcome = engine.run_realtime_cycle().await;
                    if outcome.alerts_raised > 0 {
                        info!(
                            "Real-time analysis raised {} alerts (score {:.1})",
                            outcome.alerts_raised, outcome.overall_score
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Real-time analysis loop stopped");
    }
}
