//! Queued sync operation model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Assessment, CatchId, CatchRecord};
use crate::error::{Error, Result};

/// Kind of mutation a queued operation carries to the remote ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl OperationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(Error::InvalidInput(format!(
                "unknown operation kind '{other}'"
            ))),
        }
    }
}

/// Queue-side state of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// Waiting to be sent
    Pending,
    /// A remote request is in flight
    Processing,
    /// The last attempt failed; kept until retried or discarded
    Failed,
}

impl OperationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "failed" => Ok(Self::Failed),
            other => Err(Error::InvalidInput(format!(
                "unknown operation status '{other}'"
            ))),
        }
    }
}

/// Snapshot taken at enqueue time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationPayload {
    /// Full record for create/update
    Record(CatchRecord),
    /// Id of a deleted record
    Removed(CatchId),
}

/// A durable, not-yet-committed mutation
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOperation {
    /// Queue-local identifier; also the FIFO order
    pub id: i64,
    pub record_id: CatchId,
    pub kind: OperationKind,
    pub payload: OperationPayload,
    /// Enqueue time (Unix ms)
    pub enqueued_at: i64,
    pub status: OperationStatus,
    /// Failed attempts so far
    pub attempts: u32,
    /// Earliest time (Unix ms) an automatic retry may run
    pub next_attempt_at: i64,
    pub last_error: Option<String>,
}

impl SyncOperation {
    /// Whether the sync loop may pick this operation up at `now_ms`
    #[must_use]
    pub const fn is_ready(&self, now_ms: i64) -> bool {
        match self.status {
            OperationStatus::Pending => true,
            OperationStatus::Failed => self.next_attempt_at <= now_ms,
            OperationStatus::Processing => false,
        }
    }
}

/// Result the remote ledger returns for an accepted operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteAck {
    /// Authoritative score for create/update, if the ledger scored the catch
    pub assessment: Option<Assessment>,
    pub compliance: Option<ComplianceNotice>,
}

impl RemoteAck {
    /// Bare acknowledgment (e.g. for deletes)
    #[must_use]
    pub fn bare() -> Self {
        Self::default()
    }
}

/// Regulatory flag raised by the remote ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceNotice {
    pub warning: bool,
    pub details: Option<String>,
}
