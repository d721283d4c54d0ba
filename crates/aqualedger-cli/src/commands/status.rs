use aqualedger_core::state::SyncState;
use serde::Serialize;

use crate::commands::common::open_store;
use crate::config::CliSettings;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub state: SyncState,
    pub description: &'static str,
    pub pending: usize,
    pub synced: usize,
    pub error: usize,
    pub queued: usize,
    pub failed_operations: usize,
    pub remote_configured: bool,
}

pub async fn run_status(as_json: bool, settings: &CliSettings) -> Result<(), CliError> {
    let report = status_report(settings).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}: {}", report.state, report.description);
    println!(
        "catches: {} pending, {} synced, {} error",
        report.pending, report.synced, report.error
    );
    println!(
        "queue:   {} operations, {} failed",
        report.queued, report.failed_operations
    );
    if !report.remote_configured {
        println!("No remote ledger configured; catches stay on this device.");
    }
    Ok(())
}

/// The CLI has no network probe; a configured remote counts as online.
pub async fn status_report(settings: &CliSettings) -> Result<StatusReport, CliError> {
    let store = open_store(settings).await?;
    let records = store.status_counts().await?;
    let queue = store.queue_counts().await?;
    let remote_configured = settings.ledger.has_remote();
    let state = SyncState::derive(&records, &queue, remote_configured, false);

    Ok(StatusReport {
        state,
        description: state.describe(),
        pending: records.pending,
        synced: records.synced,
        error: records.error,
        queued: queue.total(),
        failed_operations: queue.failed,
        remote_configured,
    })
}
