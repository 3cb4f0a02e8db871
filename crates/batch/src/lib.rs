//! Bounded-concurrency batch execution.
//!
//! The batch layer is the execution substrate under product-identity
//! clustering: it runs caller-supplied async work (embedding fetches, feature
//! extraction, pairwise similarity) over N items while keeping the number of
//! simultaneously in-flight operations at or below a fixed cap.
//!
//! ## Core Types
//!
//! - [`ConcurrencyLimiter`]: counting-semaphore gate with `run` / `run_all`.
//! - [`BatchProcessor`]: maps a processor over a batch with per-item timeout
//!   and per-item failure isolation.
//! - [`ProcessResult`]: successes, [`ItemFailure`] list, and timing
//!   aggregates for one run.
//!
//! ## The contract
//!
//! Once a [`BatchProcessor`] is constructed, a batch run cannot fail: one
//! item's error (or timeout) is captured into the failure list and every
//! other item still completes. Partial failure is the expected and only
//! failure mode.
//!
//! ## Example
//!
//! ```
//! use batch::{BatchConfig, BatchProcessor};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let processor = BatchProcessor::new(BatchConfig::default()).unwrap();
//! let result = processor
//!     .process_parallel(vec![1u32, 2, 3], |n| async move { Ok(n * 2) })
//!     .await;
//! assert_eq!(result.success_count(), 3);
//! # }
//! ```

mod error;
mod limiter;
mod processor;

pub use crate::error::BatchError;
pub use crate::limiter::ConcurrencyLimiter;
pub use crate::processor::{
    BatchConfig, BatchProcessor, BoxError, ItemFailure, ProcessResult, OPERATION_TIMEOUT,
};
