use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Result of a computer-algebra primitive.
pub type CasResult<T> = std::result::Result<T, ComputationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported equation type: {0}")]
    UnsupportedType(String),
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputationError {
    #[error("computation failed: {0}")]
    Failed(String),
    #[error("no closed form found: {0}")]
    NotClosed(String),
    #[error("computation budget exceeded: {what} over limit {limit}")]
    BudgetExceeded { what: &'static str, limit: usize },
    #[error("computation exceeded its time limit of {0:?}")]
    TimedOut(Duration),
}

impl ComputationError {
    pub fn failed(msg: impl Into<String>) -> Self {
        ComputationError::Failed(msg.into())
    }

    pub fn not_closed(msg: impl Into<String>) -> Self {
        ComputationError::NotClosed(msg.into())
    }
}
