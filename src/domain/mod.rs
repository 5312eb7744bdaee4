pub mod alert;
pub mod analysis;
pub mod impact;
pub mod metric;
pub mod shared;
