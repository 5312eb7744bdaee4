use super::value_objects::NewMetricSample;
use async_trait::async_trait;

/// Collaborator the collection loop pulls fresh samples from.
///
/// Implementations own any I/O. A returned error (or a call that outlives the
/// collection timeout) skips that cycle; the loop keeps running.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn collect(&self) -> anyhow::Result<Vec<NewMetricSample>>;
}
