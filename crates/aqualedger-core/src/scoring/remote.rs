//! Client for the remote AI scoring service

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::{ScoringRequest, SustainabilityScorer};
use crate::http::{normalize_endpoint, parse_api_error};
use crate::models::Assessment;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Invalid scoring configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Scoring HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Scoring API error: {0}")]
    Api(String),
    #[error("Invalid scoring payload: {0}")]
    InvalidPayload(String),
}

pub type ScoringResult<T> = Result<T, ScoringError>;

/// HTTP client for `POST {endpoint}/v1/score` and `/v1/recommendations`
#[derive(Clone)]
pub struct HttpScoringClient {
    endpoint: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpScoringClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpScoringClient")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpScoringClient {
    pub fn new(endpoint: impl Into<String>) -> ScoringResult<Self> {
        let endpoint =
            normalize_endpoint(endpoint.into()).map_err(ScoringError::InvalidConfiguration)?;
        Ok(Self {
            endpoint,
            token: None,
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
        })
    }

    /// Attach a bearer token; blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = crate::util::normalize_text_option(token);
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask the service for an assessment of one catch.
    pub async fn score(&self, request: &ScoringRequest) -> ScoringResult<Assessment> {
        let payload: ScoreResponse = self.post("v1/score", request).await?;
        payload.try_into()
    }

    /// Ask the service for practical sustainability tips for a catch.
    pub async fn recommendations(&self, request: &ScoringRequest) -> ScoringResult<Vec<String>> {
        let payload: RecommendationsResponse = self.post("v1/recommendations", request).await?;
        let tips: Vec<String> = payload
            .recommendations
            .into_iter()
            .map(|tip| tip.trim().to_string())
            .filter(|tip| !tip.is_empty())
            .collect();
        if tips.is_empty() {
            return Err(ScoringError::InvalidPayload(
                "response did not include any recommendations".to_string(),
            ));
        }
        Ok(tips)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: &ScoringRequest,
    ) -> ScoringResult<T> {
        if request.species.trim().is_empty() {
            return Err(ScoringError::InvalidConfiguration(
                "species must not be empty".to_string(),
            ));
        }

        let mut builder = self
            .client
            .post(format!("{}/{path}", self.endpoint))
            .header("Accept", "application/json")
            .json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScoringError::Api(parse_api_error(status, &body)));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|error| ScoringError::InvalidPayload(error.to_string()))
    }
}

impl SustainabilityScorer for HttpScoringClient {
    async fn assess(&self, request: &ScoringRequest) -> ScoringResult<Assessment> {
        self.score(request).await
    }
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: Option<f64>,
    rationale: Option<String>,
}

impl TryFrom<ScoreResponse> for Assessment {
    type Error = ScoringError;

    fn try_from(value: ScoreResponse) -> ScoringResult<Self> {
        let score = value.score.ok_or_else(|| {
            ScoringError::InvalidPayload("response did not include score".to_string())
        })?;
        let rationale = value
            .rationale
            .map(|rationale| rationale.trim().to_string())
            .filter(|rationale| !rationale.is_empty())
            .ok_or_else(|| {
                ScoringError::InvalidPayload("response did not include rationale".to_string())
            })?;
        Ok(Self::from_raw(score, rationale))
    }
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    #[serde(default)]
    recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_endpoints() {
        assert!(matches!(
            HttpScoringClient::new(""),
            Err(ScoringError::InvalidConfiguration(_))
        ));
        assert!(HttpScoringClient::new("scoring.example.com").is_err());
        let client = HttpScoringClient::new("https://scoring.example.com/").unwrap();
        assert_eq!(client.endpoint(), "https://scoring.example.com");
    }

    #[test]
    fn debug_redacts_token() {
        let client = HttpScoringClient::new("https://scoring.example.com")
            .unwrap()
            .with_token(Some("secret".to_string()));
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn score_response_is_clamped() {
        let assessment = Assessment::try_from(ScoreResponse {
            score: Some(140.2),
            rationale: Some(" abundant stock ".to_string()),
        })
        .unwrap();
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.rationale, "abundant stock");
    }

    #[test]
    fn score_response_requires_fields() {
        assert!(Assessment::try_from(ScoreResponse {
            score: None,
            rationale: Some("x".to_string()),
        })
        .is_err());
        assert!(Assessment::try_from(ScoreResponse {
            score: Some(50.0),
            rationale: Some("  ".to_string()),
        })
        .is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_service_is_an_http_error() {
        let client = HttpScoringClient::new("http://127.0.0.1:9").unwrap();
        let error = client
            .score(&ScoringRequest::new("Cod"))
            .await
            .unwrap_err();
        assert!(matches!(error, ScoringError::Http(_)));
    }
}
