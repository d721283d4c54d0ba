//! Remote ledger collaborator

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::{normalize_endpoint, parse_api_error};
use crate::models::{
    Assessment, CatchId, ComplianceNotice, OperationKind, OperationPayload, RemoteAck,
    SyncOperation,
};
use crate::util::normalize_text_option;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport failure; the remote outcome is unknown
    #[error("Remote ledger unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("Remote ledger rejected the operation: {message} ({status})")]
    RemoteRejected { status: u16, message: String },
    #[error("Invalid sync configuration: {0}")]
    InvalidConfiguration(String),
}

impl SyncError {
    /// Whether the remote itself could not be reached
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnreachable(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkUnreachable(error.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Destination that commits queued operations
pub trait RemoteLedger {
    /// Commit one operation. `Ok` means the remote accepted it.
    fn commit(&self, operation: &SyncOperation)
        -> impl Future<Output = SyncResult<RemoteAck>> + Send;
}

/// Body sent to `POST {endpoint}/v1/sync`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommitRequest<'a> {
    operation_id: i64,
    record_id: &'a CatchId,
    operation: OperationKind,
    payload: &'a OperationPayload,
    enqueued_at: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    score: Option<f64>,
    rationale: Option<String>,
    compliance_warning: Option<bool>,
    compliance_details: Option<String>,
}

impl From<CommitResponse> for RemoteAck {
    fn from(value: CommitResponse) -> Self {
        let assessment = value
            .score
            .zip(normalize_text_option(value.rationale))
            .map(|(score, rationale)| Assessment::from_raw(score, rationale));
        let compliance = value.compliance_warning.map(|warning| ComplianceNotice {
            warning,
            details: normalize_text_option(value.compliance_details),
        });
        Self {
            assessment,
            compliance,
        }
    }
}

/// HTTP implementation of [`RemoteLedger`]
#[derive(Clone)]
pub struct HttpRemoteLedger {
    endpoint: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpRemoteLedger {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpRemoteLedger")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpRemoteLedger {
    pub fn new(endpoint: impl Into<String>) -> SyncResult<Self> {
        let endpoint =
            normalize_endpoint(endpoint.into()).map_err(SyncError::InvalidConfiguration)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| SyncError::InvalidConfiguration(error.to_string()))?;
        Ok(Self {
            endpoint,
            token: None,
            client,
        })
    }

    /// Attach a bearer token; blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = normalize_text_option(token);
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteLedger for HttpRemoteLedger {
    async fn commit(&self, operation: &SyncOperation) -> SyncResult<RemoteAck> {
        let body = CommitRequest {
            operation_id: operation.id,
            record_id: &operation.record_id,
            operation: operation.kind,
            payload: &operation.payload,
            enqueued_at: operation.enqueued_at,
        };

        // Re-sending after an interrupted attempt must not apply twice
        let idempotency_key = format!("{}:{}", operation.record_id, operation.id);
        let mut request = self
            .client
            .post(format!("{}/v1/sync", self.endpoint))
            .header("Accept", "application/json")
            .header("Idempotency-Key", idempotency_key)
            .json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SyncError::RemoteRejected {
                status: status.as_u16(),
                message: parse_api_error(status, &text),
            });
        }

        if text.trim().is_empty() {
            return Ok(RemoteAck::bare());
        }
        match serde_json::from_str::<CommitResponse>(&text) {
            Ok(payload) => Ok(payload.into()),
            Err(error) => {
                tracing::debug!("Ignoring unreadable acknowledgment body: {error}");
                Ok(RemoteAck::bare())
            }
        }
    }
}
