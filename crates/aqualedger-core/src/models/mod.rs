//! Data models for AquaLedger

mod assessment;
mod catch;
mod sync_operation;

pub use assessment::{Assessment, MAX_SCORE};
pub use catch::{
    validate_species, validate_weight, CatchId, CatchPatch, CatchRecord, NewCatch, SyncStatus,
};
pub use sync_operation::{
    ComplianceNotice, OperationKind, OperationPayload, OperationStatus, RemoteAck, SyncOperation,
};
