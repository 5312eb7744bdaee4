use async_trait::async_trait;
use std::collections::VecDeque;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::metric::{source::MetricSource, value_objects::NewMetricSample};
use crate::domain::shared::errors::DomainError;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("sample queue is full ({pending}/{capacity} pending)")]
    Full { pending: usize, capacity: usize },
    #[error(transparent)]
    Rejected(#[from] DomainError),
}

/// Bounded in-process buffer between ingestion front-ends and the collection loop.
///
/// Front-ends `push`; every collection cycle drains whatever is pending.
pub struct SampleQueue {
    pending: Mutex<VecDeque<NewMetricSample>>,
    capacity: usize,
}

impl SampleQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Enqueues a batch atomically: either every sample fits or none is queued.
    ///
    /// # Errors
    ///
    /// `QueueError::Rejected` when any sample is structurally invalid,
    /// `QueueError::Full` when the batch would exceed the capacity.
    pub async fn push(&self, samples: Vec<NewMetricSample>) -> Result<usize, QueueError> {
        for sample in &samples {
            sample.check()?;
        }

        let mut pending = self.pending.lock().await;
        if pending.len() + samples.len() > self.capacity {
            return Err(QueueError::Full {
                pending: pending.len(),
                capacity: self.capacity,
            });
        }

        let count = samples.len();
        pending.extend(samples);
        debug!("Queued {} samples ({} pending)", count, pending.len());
        Ok(count)
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    pub async fn drain(&self) -> Vec<NewMetricSample> {
        self.pending.lock().await.drain(..).collect()
    }
}

#[async_trait]
impl MetricSource for SampleQueue {
    async fn collect(&self) -> anyhow::Result<Vec<NewMetricSample>> {
        Ok(self.drain().await)
    }
}
