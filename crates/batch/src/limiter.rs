//! Counting-semaphore concurrency gate.
//!
//! Caps how many operations run simultaneously, independent of how many are
//! submitted. Built on [`tokio::sync::Semaphore`] so a waiting task wakes
//! exactly when a slot frees; there is no polling.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;

use crate::error::BatchError;

/// Bounded-parallelism executor.
///
/// At no point do more than `max_concurrency` submitted operations execute at
/// once. Admission order beyond "a task starts when a slot frees" is not
/// guaranteed; this is a counting semaphore, not a FIFO queue.
///
/// Cloning is cheap and shares the same permit pool.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    permits: Arc<Semaphore>,
    max_concurrency: usize,
}

impl ConcurrencyLimiter {
    /// Default cap, sized for coarse-grained I/O-bound work such as calls to
    /// an embedding provider.
    pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

    /// Create a limiter admitting at most `max_concurrency` operations.
    pub fn new(max_concurrency: usize) -> Result<Self, BatchError> {
        if max_concurrency == 0 {
            return Err(BatchError::InvalidConfig(
                "max_concurrency must be greater than zero".into(),
            ));
        }
        Ok(Self {
            permits: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        })
    }

    /// The configured concurrency cap.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Slots currently free. Snapshot only; another task may take a slot
    /// immediately after this returns.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run a single operation once a slot is free.
    ///
    /// The future produced by `task` is not created until the slot is held,
    /// so lazy work (including timeout clocks) starts at admission, not at
    /// submission.
    pub async fn run<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // The semaphore is never closed, so acquire can only fail on a bug.
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("concurrency limiter semaphore closed");
        task().await
    }

    /// Schedule every operation under the cap and collect all outputs in
    /// input order once the last one completes.
    ///
    /// A panicking operation resumes its panic on the caller; use
    /// [`run_all_settled`](Self::run_all_settled) when panics must be
    /// contained per slot.
    pub async fn run_all<F, Fut, T>(&self, tasks: Vec<F>) -> Vec<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_all_settled(tasks)
            .await
            .into_iter()
            .map(|outcome| match outcome {
                Ok(value) => value,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => panic!("limiter task cancelled: {err}"),
            })
            .collect()
    }

    /// Like [`run_all`](Self::run_all), but each operation settles
    /// independently: a panic inside one operation is reported as that slot's
    /// [`JoinError`] instead of unwinding into the caller and taking the
    /// other operations' outputs with it.
    pub async fn run_all_settled<F, Fut, T>(&self, tasks: Vec<F>) -> Vec<Result<T, JoinError>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let permits = Arc::clone(&self.permits);
            handles.push(tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .expect("concurrency limiter semaphore closed");
                task().await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await);
        }
        results
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(Self::DEFAULT_MAX_CONCURRENCY)),
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
        }
    }
}
