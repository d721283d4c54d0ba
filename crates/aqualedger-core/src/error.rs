//! Error types for aqualedger-core

use thiserror::Error;

/// Result type alias using aqualedger-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in aqualedger-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local durable storage rejected a read or write (full, locked, missing)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch or queue entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
