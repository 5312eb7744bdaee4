use std::fmt;
use std::sync::Arc;

/// User supplied reduction over the values of a KPI window.
pub type Aggregator = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// How a KPI window is reduced to a single value.
#[derive(Clone, Default)]
pub enum Aggregation {
    /// Arithmetic mean, used for rates and anything without a registration
    #[default]
    Mean,
    /// Most recent value, for gauges
    Latest,
    /// Sum of all values, for counters
    Sum,
    Min,
    Max,
    Custom(Aggregator),
}

impl Aggregation {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Aggregation::Custom(Arc::new(f))
    }

    /// Reduces `values` (ascending by timestamp). Returns `None` for an empty window.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }

        let value = match self {
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Latest => *values.last()?,
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Custom(f) => f(values),
        };
        Some(value)
    }
}

impl fmt::Debug for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Mean => f.write_str("Mean"),
            Aggregation::Latest => f.write_str("Latest"),
            Aggregation::Sum => f.write_str("Sum"),
            Aggregation::Min => f.write_str("Min"),
            Aggregation::Max => f.write_str("Max"),
            Aggregation::Custom(_) => f.write_str("Custom"),
        }
    }
}
