//! Embedding similarity layer for product-identity grouping.
//!
//! Two product photos are "the same item" when their embedding vectors point
//! the same way. This crate owns the numeric half of that decision:
//!
//! - [`cosine_similarity`]: strict-validation cosine similarity over raw
//!   `f32` embedding vectors.
//! - [`classify_similarity`] / [`SimilarityThresholds`]: collapse a raw score
//!   into one of four [`SimilarityTier`] values with closed-lower-bound
//!   thresholds.
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no shared state. Same vectors, same result, on any
//! machine. Embeddings are borrowed, never mutated, never retained.
//!
//! ## Invariants worth knowing
//!
//! - Compared vectors must share a length; the engine is otherwise
//!   dimension-agnostic (512 and 1024 dims are what embedding providers
//!   actually hand us).
//! - A zero vector compares as `0.0` against anything, by definition.
//! - `score >= threshold` belongs to the higher tier.

mod classify;
mod error;
mod vector;

pub use crate::classify::{classify_similarity, SimilarityThresholds, SimilarityTier};
pub use crate::error::SimilarityError;
pub use crate::vector::cosine_similarity;
