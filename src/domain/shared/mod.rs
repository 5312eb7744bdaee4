pub mod errors;
pub mod severity;
