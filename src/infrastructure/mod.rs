pub mod alerts;
pub mod queue;
pub mod store;
