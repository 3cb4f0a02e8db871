//! Product-identity engine: decide which uploaded product photos depict the
//! same physical item.
//!
//! This crate stitches the similarity math and the bounded-concurrency batch
//! layer into a clustering pipeline with a single API entry point:
//!
//! - [`cosine_similarity`] scores two embedding vectors, with strict input
//!   validation.
//! - [`classify_similarity`] collapses a score into one of four
//!   [`SimilarityTier`] values for caller-side reporting.
//! - [`BatchProcessor`] runs per-item async work under a concurrency cap with
//!   per-item timeout and failure isolation.
//! - [`ClusterEngine`] computes the full pairwise similarity matrix in
//!   bounded parallel fan-out and partitions the batch with a greedy
//!   single-pass sweep.
//!
//! Everything is scoped to a single call: no process-wide state, no cache, no
//! persistence. One bad image surfaces in the failure list; it never aborts
//! the rest of a batch.
//!
//! ## Example
//!
//! ```
//! use product_identity::{cluster_images_parallel, BatchConfig, ImageEmbedding};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let images = vec![
//!     ImageEmbedding::new("img1", vec![1.0, 0.0, 0.0]),
//!     ImageEmbedding::new("img2", vec![0.99, 0.01, 0.0]),
//!     ImageEmbedding::new("img3", vec![0.0, 1.0, 0.0]),
//! ];
//!
//! let result = cluster_images_parallel(&images, 0.92, BatchConfig::default())
//!     .await
//!     .unwrap();
//! assert_eq!(result.clusters, vec![vec!["img1", "img2"], vec!["img3"]]);
//! # }
//! ```
//!
//! ## Observability
//!
//! Install a [`ClusterMetrics`] implementation via [`set_cluster_metrics`] to
//! record per-run latency and counts. Structured `tracing` events are emitted
//! at `debug` (batch lifecycle), `warn` (isolated item failures), and `info`
//! (run summaries); no subscriber is installed by the library.

pub mod cluster;
pub mod config;
pub mod metrics;

pub use batch::{
    BatchConfig, BatchError, BatchProcessor, BoxError, ConcurrencyLimiter, ItemFailure,
    ProcessResult, OPERATION_TIMEOUT,
};
pub use similarity::{
    classify_similarity, cosine_similarity, SimilarityError, SimilarityThresholds, SimilarityTier,
};

pub use crate::cluster::{
    ClusterConfig, ClusterEngine, ClusterError, ClusterResult, ImageEmbedding, PairSimilarity,
};
pub use crate::config::{ClusterYamlConfig, ConfigLoadError, PipelineConfig};
pub use crate::metrics::{set_cluster_metrics, ClusterMetrics};

/// One-shot clustering with an explicit threshold and batch configuration.
///
/// Builds a [`ClusterEngine`] for the call and runs it; the returned clusters
/// partition the input id set. Construction fails only on an invalid
/// threshold or batch configuration.
pub async fn cluster_images_parallel(
    images: &[ImageEmbedding],
    threshold: f32,
    batch: BatchConfig,
) -> Result<ClusterResult, ClusterError> {
    let engine = ClusterEngine::new(ClusterConfig { threshold, batch })?;
    Ok(engine.cluster_images(images).await)
}
