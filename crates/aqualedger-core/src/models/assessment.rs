//! Sustainability assessment attached to a catch

use serde::{Deserialize, Serialize};

/// Highest possible sustainability score
pub const MAX_SCORE: u8 = 100;

/// A sustainability score in `0..=100` with its rationale.
///
/// Score and rationale always travel together so an authoritative remote
/// verdict replaces a local estimate in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub score: u8,
    pub rationale: String,
}

impl Assessment {
    /// Create an assessment, clamping the score to `0..=100`
    #[must_use]
    pub fn new(score: u8, rationale: impl Into<String>) -> Self {
        Self {
            score: score.min(MAX_SCORE),
            rationale: rationale.into(),
        }
    }

    /// Build from an untrusted numeric score (e.g. a JSON response).
    ///
    /// Non-finite values collapse to `0`; everything else is rounded and clamped.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_raw(score: f64, rationale: impl Into<String>) -> Self {
        let score = if score.is_finite() {
            score.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
        } else {
            0
        };
        Self::new(score, rationale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_score() {
        assert_eq!(Assessment::new(250, "x").score, 100);
        assert_eq!(Assessment::new(42, "x").score, 42);
    }

    #[test]
    fn test_from_raw_rounds_and_clamps() {
        assert_eq!(Assessment::from_raw(72.6, "x").score, 73);
        assert_eq!(Assessment::from_raw(-5.0, "x").score, 0);
        assert_eq!(Assessment::from_raw(140.0, "x").score, 100);
        assert_eq!(Assessment::from_raw(f64::NAN, "x").score, 0);
    }
}
