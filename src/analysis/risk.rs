//! Risk tier classification of similarity percentages.
//!
//! The same thresholds apply to a single pairwise similarity and to a
//! document's average similarity.

use serde::{Deserialize, Serialize};

use crate::error::{ReviewError, ReviewResult};

/// Upper bound (inclusive) of the SAFE tier.
pub const SAFE_MAX: f64 = 5.0;
/// Upper bound (inclusive) of the REVIEW tier.
pub const REVIEW_MAX: f64 = 15.0;

/// Discrete risk classification, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    /// similarity <= 5
    Safe,
    /// 5 < similarity <= 15
    Review,
    /// similarity > 15
    Plagiarized,
}

impl RiskTier {
    /// User-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Safe => "Sangat Aman",
            RiskTier::Review => "Perlu Diperiksa",
            RiskTier::Plagiarized => "Plagiat",
        }
    }

    /// Foreground color as a hex string.
    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Safe => "#4CAF50",
            RiskTier::Review => "#FF9800",
            RiskTier::Plagiarized => "#F44336",
        }
    }

    /// Row background color as a hex string.
    pub fn background(&self) -> &'static str {
        match self {
            RiskTier::Safe => "#E8F5E9",
            RiskTier::Review => "#FFF3E0",
            RiskTier::Plagiarized => "#FFEBEE",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Safe => "SAFE",
            RiskTier::Review => "REVIEW",
            RiskTier::Plagiarized => "PLAGIARIZED",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying one similarity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskClass {
    pub tier: RiskTier,
    pub label: &'static str,
    pub color: &'static str,
    pub background: &'static str,
}

impl From<RiskTier> for RiskClass {
    fn from(tier: RiskTier) -> Self {
        Self {
            tier,
            label: tier.label(),
            color: tier.color(),
            background: tier.background(),
        }
    }
}

/// Classify a similarity percentage.
///
/// Values outside `[0, 100]` and non-finite values are rejected with
/// [`ReviewError::InvalidSimilarity`]; nothing is clamped.
pub fn classify(similarity: f64) -> ReviewResult<RiskClass> {
    if !similarity.is_finite() || !(0.0..=100.0).contains(&similarity) {
        return Err(ReviewError::InvalidSimilarity { value: similarity });
    }

    let tier = if similarity <= SAFE_MAX {
        RiskTier::Safe
    } else if similarity <= REVIEW_MAX {
        RiskTier::Review
    } else {
        RiskTier::Plagiarized
    };

    Ok(tier.into())
}
