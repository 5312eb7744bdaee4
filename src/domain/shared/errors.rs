use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Error kinds surfaced by the analytics engine.
///
/// `NotFound` is an expected outcome (unknown KPI, empty window) and callers are
/// expected to substitute a documented default. `InvalidInput` rejects a sample at the
/// store boundary. `ComputationDegenerate` marks an analysis that had nothing
/// meaningful to say (zero variance, too few points) and never aborts sibling analyses.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Degenerate computation: {0}")]
    ComputationDegenerate(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(err: validator::ValidationErrors) -> Self {
        DomainError::InvalidInput(err.to_string())
    }
}
