use aqualedger_core::sync::{Connectivity, DrainReport, HttpRemoteLedger, SyncLoop};

use crate::commands::common::open_store;
use crate::config::CliSettings;
use crate::error::CliError;

pub async fn run_sync(watch: bool, offline: bool, settings: &CliSettings) -> Result<(), CliError> {
    let store = open_store(settings).await?;

    if offline {
        let queue = store.queue_counts().await?;
        println!(
            "Offline: {} operations stay queued until the next sync",
            queue.total()
        );
        return Ok(());
    }

    let remote = remote_ledger(settings)?;
    tracing::info!("Syncing with {}", remote.endpoint());
    let sync_loop = SyncLoop::new(store, remote, Connectivity::new(true))
        .with_backoff(settings.ledger.sync.backoff())
        .with_poll_interval(settings.ledger.sync.poll_interval());

    if watch {
        eprintln!("Watching for queued catches (Ctrl-C to stop)");
        sync_loop
            .run(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;
    } else {
        let report = sync_loop.drain_once().await?;
        println!("{}", format_drain_report(&report));
    }

    let state = sync_loop.status().await?;
    println!("{state}: {}", state.describe());
    Ok(())
}

pub fn remote_ledger(settings: &CliSettings) -> Result<HttpRemoteLedger, CliError> {
    let Some(endpoint) = settings.ledger.remote_endpoint.clone() else {
        return Err(CliError::SyncNotConfigured);
    };
    Ok(HttpRemoteLedger::new(endpoint)?.with_token(settings.api_token.clone()))
}

pub fn format_drain_report(report: &DrainReport) -> String {
    if report.offline {
        return "Offline; nothing sent".to_string();
    }
    let mut line = format!(
        "Sync completed: {} synced, {} failed",
        report.synced, report.failed
    );
    if report.interrupted {
        line.push_str(" (interrupted, remaining changes stay queued)");
    }
    line
}
