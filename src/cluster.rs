//! Batch clustering of product images by embedding similarity.
//!
//! The engine computes the full pairwise similarity matrix under the batch
//! layer's concurrency cap, then partitions the images with a greedy
//! single-pass, seed-first sweep. The greedy sweep is deliberate and must
//! stay: it is cheap, deterministic given input order, and NOT a transitive
//! closure. Two images each similar to a common third image but not to each
//! other only share a cluster when that third image is the seed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use batch::{BatchConfig, BatchProcessor, ItemFailure, ProcessResult};
use similarity::{cosine_similarity, SimilarityThresholds};

use crate::metrics::metrics_recorder;

#[cfg(test)]
mod tests;

/// Errors raised while constructing a clustering engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Batch(#[from] batch::BatchError),
}

/// One uploaded product photo with its embedding vector.
///
/// The embedding is opaque caller input from an external provider; the engine
/// never mutates it and retains nothing past the call. `metadata` rides along
/// untouched for callers that track provenance per image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageEmbedding {
    pub id: String,
    pub embedding: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ImageEmbedding {
    pub fn new(id: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            embedding,
            metadata: None,
        }
    }
}

/// Tuning knobs for one clustering engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfig {
    /// Minimum pairwise similarity for two images to share a cluster.
    /// Defaults to the same-product tier cut-off.
    #[serde(default = "ClusterConfig::default_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl ClusterConfig {
    pub(crate) fn default_threshold() -> f32 {
        SimilarityThresholds::default().same_product
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ClusterError> {
        if !self.threshold.is_finite() {
            return Err(ClusterError::InvalidConfig(
                "threshold must be finite".into(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err(ClusterError::InvalidConfig(
                "threshold must be within [-1.0, 1.0]".into(),
            ));
        }
        self.batch.validate()?;
        Ok(())
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
            batch: BatchConfig::default(),
        }
    }
}

/// Cosine similarity for one unordered index pair, `left < right`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PairSimilarity {
    pub left: usize,
    pub right: usize,
    pub score: f32,
}

/// Outcome of one clustering run.
///
/// `clusters` partitions the input id set exactly: every input id appears in
/// exactly one cluster, singletons included. `failures` lists the pairs whose
/// similarity could not be computed (keyed `pair-{i}-{j}`); such pairs are
/// treated as below-threshold rather than aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterResult {
    pub clusters: Vec<Vec<String>>,
    pub failures: Vec<ItemFailure>,
    /// Number of unordered pairs compared: `n * (n - 1) / 2`.
    pub pair_count: usize,
    pub total_time_ms: u64,
}

impl ClusterResult {
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }
}

/// Partitions a batch of images into product groups.
///
/// The engine holds no cross-call state; a single instance may serve
/// concurrent callers, and each call's concurrency cap applies to that call's
/// pairwise fan-out.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    processor: BatchProcessor,
    config: ClusterConfig,
}

impl ClusterEngine {
    /// Build an engine from a validated config.
    pub fn new(config: ClusterConfig) -> Result<Self, ClusterError> {
        config.validate()?;
        Ok(Self {
            processor: BatchProcessor::new(config.batch)?,
            config,
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Group images believed to depict the same physical product.
    ///
    /// Step 1 computes every unordered pair's cosine similarity under the
    /// concurrency cap (the dominant cost, `n(n-1)/2` comparisons). Step 2 is
    /// the greedy sweep: in input order, each unassigned image seeds a new
    /// cluster and claims every later unassigned image whose similarity to
    /// the seed meets the threshold. Input order is therefore part of the
    /// contract.
    pub async fn cluster_images(&self, images: &[ImageEmbedding]) -> ClusterResult {
        let started = Instant::now();

        if images.is_empty() {
            return ClusterResult {
                clusters: Vec::new(),
                failures: Vec::new(),
                pair_count: 0,
                total_time_ms: 0,
            };
        }

        let shared: Arc<Vec<ImageEmbedding>> = Arc::new(images.to_vec());
        let mut pairs = Vec::with_capacity(images.len() * (images.len() - 1) / 2);
        for i in 0..images.len() {
            for j in (i + 1)..images.len() {
                pairs.push((i, j));
            }
        }
        let pair_count = pairs.len();

        let matrix = self.pairwise_similarities(Arc::clone(&shared), pairs).await;

        let mut scores: HashMap<(usize, usize), f32> = HashMap::with_capacity(matrix.successes.len());
        for pair in &matrix.successes {
            scores.insert((pair.left, pair.right), pair.score);
        }

        let clusters = greedy_partition(&shared, &scores, self.config.threshold);
        let total_time_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            images = images.len(),
            clusters = clusters.len(),
            pairs = pair_count,
            failures = matrix.failures.len(),
            total_time_ms,
            "clustering complete"
        );

        if let Some(recorder) = metrics_recorder() {
            recorder.record_clustering(
                images.len(),
                clusters.len(),
                matrix.failures.len(),
                started.elapsed(),
            );
        }

        ClusterResult {
            clusters,
            failures: matrix.failures,
            pair_count,
            total_time_ms,
        }
    }

    /// Bounded parallel fan-out of cosine similarity over index pairs; the
    /// "similarity for a pair" adapter over the batch processor.
    async fn pairwise_similarities(
        &self,
        images: Arc<Vec<ImageEmbedding>>,
        pairs: Vec<(usize, usize)>,
    ) -> ProcessResult<PairSimilarity> {
        let named = pairs
            .into_iter()
            .map(|(i, j)| (format!("pair-{i}-{j}"), (i, j)))
            .collect();

        self.processor
            .process_named(named, move |(i, j): (usize, usize)| {
                let images = Arc::clone(&images);
                async move {
                    let score = cosine_similarity(&images[i].embedding, &images[j].embedding)?;
                    Ok(PairSimilarity {
                        left: i,
                        right: j,
                        score,
                    })
                }
            })
            .await
    }
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self {
            processor: BatchProcessor::default(),
            config: ClusterConfig::default(),
        }
    }
}

/// Greedy single-pass, seed-first partition over precomputed pair scores.
///
/// Scores are keyed `(i, j)` with `i < j`; a missing entry (failed pair)
/// compares as below threshold.
fn greedy_partition(
    images: &[ImageEmbedding],
    scores: &HashMap<(usize, usize), f32>,
    threshold: f32,
) -> Vec<Vec<String>> {
    let mut assigned = vec![false; images.len()];
    let mut clusters = Vec::new();

    for seed in 0..images.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut cluster = vec![images[seed].id.clone()];

        for other in (seed + 1)..images.len() {
            if assigned[other] {
                continue;
            }
            if let Some(&score) = scores.get(&(seed, other)) {
                if score >= threshold {
                    cluster.push(images[other].id.clone());
                    assigned[other] = true;
                }
            }
        }

        clusters.push(cluster);
    }

    clusters
}
