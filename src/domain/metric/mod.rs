pub mod entity;
pub mod kpi;
pub mod source;
pub mod value_objects;
