pub mod entity;
pub mod snapshot;
