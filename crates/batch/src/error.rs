use thiserror::Error;

/// Errors raised while constructing batch-execution primitives.
///
/// Running a batch never returns an error: per-item failures are reported in
/// [`ProcessResult::failures`](crate::ProcessResult) instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
