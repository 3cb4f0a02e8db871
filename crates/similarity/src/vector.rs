//! Cosine similarity over raw embedding vectors.
//!
//! Single-pass: dot product and both squared norms accumulate together. The
//! accumulator is f64 so long vectors (512-1024 dims are typical) don't lose
//! precision to f32 summation order.

use crate::error::SimilarityError;

/// Compute the cosine similarity between two embeddings.
///
/// Both vectors must be non-empty, the same length, and contain only finite
/// values; validation runs before any arithmetic. The result is mathematically
/// in `[-1.0, 1.0]` up to floating-point tolerance.
///
/// A zero vector carries no directional information, so if either norm is
/// zero the similarity is defined as `0.0` rather than an error.
///
/// # Examples
///
/// ```
/// use similarity::cosine_similarity;
///
/// let sim = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap();
/// assert!((sim - 1.0).abs() < 1e-6);
///
/// let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
/// assert!(sim.abs() < 1e-6);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.is_empty() || b.is_empty() {
        return Err(SimilarityError::EmptyEmbedding);
    }
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    validate_finite(a)?;
    validate_finite(b)?;

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

fn validate_finite(v: &[f32]) -> Result<(), SimilarityError> {
    match v.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(SimilarityError::InvalidValue { index }),
        None => Ok(()),
    }
}
