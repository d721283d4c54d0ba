//! aqualedger-core - Core library for AquaLedger
//!
//! Offline-first catch logging: transcript parsing, local sustainability
//! scoring, the durable catch store with its sync queue, and the loop that
//! pushes queued operations to the remote ledger. Shared by every client.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod export;
mod http;
pub mod models;
pub mod parser;
pub mod scoring;
pub mod services;
pub mod state;
pub mod sync;
pub mod util;
pub mod voice;

pub use error::{Error, Result};
pub use models::{CatchId, CatchRecord, SyncStatus};
