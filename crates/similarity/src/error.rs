use thiserror::Error;

/// Errors raised by embedding validation before any similarity math runs.
///
/// These are caller errors: malformed input should be fixed, not retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("embedding arrays cannot be empty")]
    EmptyEmbedding,
    #[error("embedding dimensions must match: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    #[error("embedding contains a non-finite value at index {index}")]
    InvalidValue { index: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
