pub mod aggregation;
pub mod metric_store;
