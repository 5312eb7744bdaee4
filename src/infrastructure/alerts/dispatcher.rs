use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::domain::alert::entity::Alert;

/// Notification collaborator (email, paging, UI toast).
///
/// Delivery is synchronous: the triggering call returns only after every
/// subscriber has been invoked.
pub trait AlertSubscriber: Send + Sync {
    fn on_alert(&self, alert: &Alert) -> anyhow::Result<()>;
}

impl<F> AlertSubscriber for F
where
    F: Fn(&Alert) -> anyhow::Result<()> + Send + Sync,
{
    fn on_alert(&self, alert: &Alert) -> anyhow::Result<()> {
        self(alert)
    }
}

/// Fans alerts out to subscribers in registration order.
#[derive(Default)]
pub struct AlertDispatcher {
    subscribers: RwLock<Vec<Arc<dyn AlertSubscriber>>>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn AlertSubscriber>) {
        let mut subscribers = match self.subscribers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.snapshot().len()
    }

    fn snapshot(&self) -> Vec<Arc<dyn AlertSubscriber>> {
        match self.subscribers.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Delivers `alert` to every subscriber and returns how many accepted it.
    ///
    /// A subscriber that errors or panics is logged and skipped; later
    /// subscribers still receive the alert.
    pub fn dispatch(&self, alert: &Alert) -> usize {
        let subscribers = self.snapshot();
        let mut delivered = 0;

        for (position, subscriber) in subscribers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| subscriber.on_alert(alert))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    warn!(
                        "Alert subscriber #{} failed for '{}': {}",
                        position, alert.title, e
                    );
                }
                Err(_) => {
                    warn!(
                        "Alert subscriber #{} panicked for '{}'",
                        position, alert.title
                    );
                }
            }
        }

        debug!(
            "Delivered alert '{}' ({}) to {}/{} subscribers",
            alert.title,
            alert.severity,
            delivered,
            subscribers.len()
        );
        delivered
    }
}
