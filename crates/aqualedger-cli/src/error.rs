use std::io;

use aqualedger_core::scoring::ScoringError;
use aqualedger_core::sync::SyncError;
use aqualedger_core::voice::VoiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] aqualedger_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Voice(#[from] VoiceError),
    #[error("No catch description provided")]
    EmptyText,
    #[error("Catch ID cannot be empty")]
    EmptyCatchId,
    #[error("Nothing to change; pass --species, --weight or --clear-photo")]
    NothingToEdit,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync is not configured. Run `aqualedger config init --remote-endpoint <URL>` or set AQUALEDGER_REMOTE_URL."
    )]
    SyncNotConfigured,
    #[error(
        "Scoring service is not configured. Run `aqualedger config init --scoring-endpoint <URL>` or set AQUALEDGER_SCORING_URL."
    )]
    ScoringNotConfigured,
}
