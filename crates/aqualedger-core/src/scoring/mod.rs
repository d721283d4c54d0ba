//! Sustainability scoring
//!
//! [`LocalScorer`] is a deterministic offline heuristic used for an immediate
//! estimate. [`HttpScoringClient`] talks to the AI-backed scoring service when
//! the device is online; [`assess_with_fallback`] prefers the remote verdict and
//! falls back to the local one when the service fails.

mod local;
mod remote;

use std::future::Future;

use serde::Serialize;

use crate::models::Assessment;

pub use local::LocalScorer;
pub use remote::{HttpScoringClient, ScoringError, ScoringResult};

/// Catch details sent to a scoring service
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Catch date as `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl ScoringRequest {
    #[must_use]
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }
}

/// A service able to score a catch
pub trait SustainabilityScorer {
    fn assess(
        &self,
        request: &ScoringRequest,
    ) -> impl Future<Output = ScoringResult<Assessment>> + Send;
}

/// Where an assessment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentSource {
    Local,
    Remote,
}

/// Assessment plus its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCatch {
    pub assessment: Assessment,
    pub source: AssessmentSource,
    /// Remote failure that forced the local fallback, if any
    pub fallback_reason: Option<String>,
}

/// Score with the remote service when available, else the local heuristic.
///
/// A remote failure never propagates; it is reported in `fallback_reason`.
pub async fn assess_with_fallback<S: SustainabilityScorer>(
    remote: Option<&S>,
    local: &LocalScorer,
    request: &ScoringRequest,
) -> ScoredCatch {
    let local_assessment =
        || local.score(&request.species, request.weight_kg.unwrap_or_default());

    let Some(remote) = remote else {
        return ScoredCatch {
            assessment: local_assessment(),
            source: AssessmentSource::Local,
            fallback_reason: None,
        };
    };

    match remote.assess(request).await {
        Ok(assessment) => ScoredCatch {
            assessment,
            source: AssessmentSource::Remote,
            fallback_reason: None,
        },
        Err(error) => {
            tracing::warn!("Scoring service failed, using local estimate: {error}");
            ScoredCatch {
                assessment: local_assessment(),
                source: AssessmentSource::Local,
                fallback_reason: Some(error.to_string()),
            }
        }
    }
}
