//! Batch executor: map over N items with bounded concurrency, per-item
//! timeout, and per-item failure isolation.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::BatchError;
use crate::limiter::ConcurrencyLimiter;

#[cfg(test)]
mod tests;

/// Error message recorded for an item whose processor did not settle within
/// the configured timeout.
pub const OPERATION_TIMEOUT: &str = "Operation timeout";

/// Boxed error type accepted from caller-supplied processors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Tuning knobs for a batch run.
///
/// Serde-friendly with per-field defaults so partial configs deserialize
/// cleanly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchConfig {
    /// Upper bound on simultaneously in-flight processors.
    #[serde(default = "BatchConfig::default_max_concurrency")]
    pub max_concurrency: usize,
    /// Per-item deadline, measured from admission by the limiter.
    #[serde(default = "BatchConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl BatchConfig {
    pub(crate) fn default_max_concurrency() -> usize {
        ConcurrencyLimiter::DEFAULT_MAX_CONCURRENCY
    }

    pub(crate) fn default_timeout_ms() -> u64 {
        30_000
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.max_concurrency == 0 {
            return Err(BatchError::InvalidConfig(
                "max_concurrency must be greater than zero".into(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(BatchError::InvalidConfig(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: Self::default_max_concurrency(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

/// One item that did not produce a success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemFailure {
    /// `item-{index}` for positional batches, or the caller's id for named
    /// batches.
    pub identifier: String,
    /// The processor's error message, or [`OPERATION_TIMEOUT`].
    pub error: String,
}

/// Outcome of one batch run.
///
/// Successes appear in completion-collection order, which happens to follow
/// input order here but is not part of the contract. Failures never abort the
/// batch and are reported alongside the successes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResult<T> {
    pub successes: Vec<T>,
    pub failures: Vec<ItemFailure>,
    /// Wall-clock time for the whole batch.
    pub total_time_ms: u64,
    /// Mean wall-clock time per submitted item; `0.0` for an empty batch.
    pub avg_time_per_item_ms: f64,
}

impl<T> ProcessResult<T> {
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_fully_successful(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs caller-supplied async work over a batch of items.
///
/// One bad item never prevents the rest of the batch from completing: each
/// processor error, timeout, and even panic is captured into the failure
/// list and the run itself always returns a [`ProcessResult`].
///
/// A timed-out item's future is dropped at the deadline, so unlike a
/// cooperative race the abandoned work does not keep a concurrency slot
/// occupied.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    limiter: ConcurrencyLimiter,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Build a processor from a validated config.
    pub fn new(config: BatchConfig) -> Result<Self, BatchError> {
        config.validate()?;
        Ok(Self {
            limiter: ConcurrencyLimiter::new(config.max_concurrency)?,
            config,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Run `processor` for every item under the concurrency cap.
    ///
    /// Failures are keyed by the item's position as `item-{index}`.
    pub async fn process_parallel<T, U, F, Fut>(
        &self,
        items: Vec<T>,
        processor: F,
    ) -> ProcessResult<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<U, BoxError>> + Send + 'static,
    {
        let named = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (format!("item-{index}"), item))
            .collect();
        self.run_batch(named, processor).await
    }

    /// Feature-extraction shape: items carry their own identifier (an image
    /// id, typically) which is used in the failure list instead of the
    /// positional index.
    pub async fn process_named<T, U, F, Fut>(
        &self,
        items: Vec<(String, T)>,
        processor: F,
    ) -> ProcessResult<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<U, BoxError>> + Send + 'static,
    {
        self.run_batch(items, processor).await
    }

    async fn run_batch<T, U, F, Fut>(
        &self,
        items: Vec<(String, T)>,
        processor: F,
    ) -> ProcessResult<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<U, BoxError>> + Send + 'static,
    {
        let started = Instant::now();
        let item_count = items.len();
        let timeout = Duration::from_millis(self.config.timeout_ms);

        let mut identifiers = Vec::with_capacity(item_count);
        let tasks: Vec<_> = items
            .into_iter()
            .map(|(identifier, item)| {
                identifiers.push(identifier.clone());
                let processor = processor.clone();
                move || async move {
                    match tokio::time::timeout(timeout, processor(item)).await {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(err)) => Err(ItemFailure {
                            identifier,
                            error: err.to_string(),
                        }),
                        Err(_) => Err(ItemFailure {
                            identifier,
                            error: OPERATION_TIMEOUT.to_string(),
                        }),
                    }
                }
            })
            .collect();

        let outcomes = self.limiter.run_all_settled(tasks).await;

        let mut successes = Vec::with_capacity(item_count);
        let mut failures = Vec::new();
        for (identifier, outcome) in identifiers.into_iter().zip(outcomes) {
            let failure = match outcome {
                Ok(Ok(value)) => {
                    successes.push(value);
                    continue;
                }
                Ok(Err(failure)) => failure,
                // A panicking processor is captured like any other per-item
                // error; the rest of the batch keeps its results.
                Err(join_err) => ItemFailure {
                    identifier,
                    error: panic_description(join_err),
                },
            };
            tracing::warn!(
                identifier = %failure.identifier,
                error = %failure.error,
                "batch item failed"
            );
            failures.push(failure);
        }

        let total_time_ms = started.elapsed().as_millis() as u64;
        let avg_time_per_item_ms = if item_count == 0 {
            0.0
        } else {
            total_time_ms as f64 / item_count as f64
        };

        tracing::debug!(
            items = item_count,
            successes = successes.len(),
            failures = failures.len(),
            total_time_ms,
            "batch complete"
        );

        ProcessResult {
            successes,
            failures,
            total_time_ms,
            avg_time_per_item_ms,
        }
    }
}

fn panic_description(err: tokio::task::JoinError) -> String {
    if err.is_panic() {
        let payload = err.into_panic();
        if let Some(msg) = payload.downcast_ref::<&str>() {
            format!("processor panicked: {msg}")
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            format!("processor panicked: {msg}")
        } else {
            "processor panicked".to_string()
        }
    } else {
        err.to_string()
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self {
            limiter: ConcurrencyLimiter::default(),
            config: BatchConfig::default(),
        }
    }
}
