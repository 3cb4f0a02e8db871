//! Score-to-tier classification.
//!
//! A similarity score collapses to one of four tiers. Boundaries are closed on
//! the lower bound: a score exactly equal to a threshold lands in the higher
//! tier.

use serde::{Deserialize, Serialize};

use crate::error::SimilarityError;

/// Discrete relationship between two product images, derived from a
/// similarity score.
///
/// Tiers are totally ordered: `Different < PossiblySame < LikelySame <
/// SameProduct`. Only `SameProduct` drives clustering; the intermediate tiers
/// exist for caller-side reporting ("possibly the same, please confirm").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimilarityTier {
    Different,
    PossiblySame,
    LikelySame,
    SameProduct,
}

/// Tier cut-off scores.
///
/// Serde-friendly so deployments can tune the cut-offs per tenant; the
/// defaults are the production values. Must be strictly descending:
/// `same_product > likely_same > possibly_same`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimilarityThresholds {
    #[serde(default = "SimilarityThresholds::default_same_product")]
    pub same_product: f32,
    #[serde(default = "SimilarityThresholds::default_likely_same")]
    pub likely_same: f32,
    #[serde(default = "SimilarityThresholds::default_possibly_same")]
    pub possibly_same: f32,
}

impl SimilarityThresholds {
    pub(crate) fn default_same_product() -> f32 {
        0.92
    }

    pub(crate) fn default_likely_same() -> f32 {
        0.85
    }

    pub(crate) fn default_possibly_same() -> f32 {
        0.75
    }

    /// Validate the cut-off ordering.
    pub fn validate(&self) -> Result<(), SimilarityError> {
        let all = [self.same_product, self.likely_same, self.possibly_same];
        if all.iter().any(|t| !t.is_finite()) {
            return Err(SimilarityError::InvalidConfig(
                "thresholds must be finite".into(),
            ));
        }
        if !(self.same_product > self.likely_same && self.likely_same > self.possibly_same) {
            return Err(SimilarityError::InvalidConfig(
                "thresholds must be strictly descending: same_product > likely_same > possibly_same"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Map a score onto a tier using these cut-offs.
    pub fn classify(&self, score: f32) -> SimilarityTier {
        if score >= self.same_product {
            SimilarityTier::SameProduct
        } else if score >= self.likely_same {
            SimilarityTier::LikelySame
        } else if score >= self.possibly_same {
            SimilarityTier::PossiblySame
        } else {
            SimilarityTier::Different
        }
    }
}

impl Default for SimilarityThresholds {
    fn default() -> Self {
        Self {
            same_product: Self::default_same_product(),
            likely_same: Self::default_likely_same(),
            possibly_same: Self::default_possibly_same(),
        }
    }
}

/// Classify a score with the default production thresholds.
pub fn classify_similarity(score: f32) -> SimilarityTier {
    SimilarityThresholds::default().classify(score)
}
