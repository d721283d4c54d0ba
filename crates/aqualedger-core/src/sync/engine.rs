//! The loop that drains the sync queue against the remote ledger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Notify;

use super::connectivity::wait_until_offline;
use super::{BackoffPolicy, Connectivity, RemoteLedger};
use crate::events::LedgerEvent;
use crate::models::SyncOperation;
use crate::services::CatchStore;
use crate::state::SyncState;
use crate::util::now_millis;
use crate::Result;

/// Outcome of one drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Operations the remote accepted
    pub synced: usize,
    /// Operations that failed and were scheduled for retry
    pub failed: usize,
    /// The pass stopped because connectivity was lost
    pub interrupted: bool,
    /// Nothing was attempted because the device is offline
    pub offline: bool,
}

/// Drains queued operations in FIFO order whenever the device is online.
///
/// Clones share the same queue, remote and flags, so one clone can run
/// [`SyncLoop::run`] while others nudge it or read its status.
pub struct SyncLoop<R> {
    store: CatchStore,
    remote: Arc<R>,
    connectivity: Connectivity,
    backoff: BackoffPolicy,
    poll_interval: Duration,
    nudge: Arc<Notify>,
    syncing: Arc<AtomicBool>,
}

impl<R> Clone for SyncLoop<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            remote: Arc::clone(&self.remote),
            connectivity: self.connectivity.clone(),
            backoff: self.backoff,
            poll_interval: self.poll_interval,
            nudge: Arc::clone(&self.nudge),
            syncing: Arc::clone(&self.syncing),
        }
    }
}

/// Clears the syncing flag however the pass ends
struct SyncingGuard<'a>(&'a AtomicBool);

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<R: RemoteLedger + Send + Sync> SyncLoop<R> {
    pub fn new(store: CatchStore, remote: R, connectivity: Connectivity) -> Self {
        Self {
            store,
            remote: Arc::new(remote),
            connectivity,
            backoff: BackoffPolicy::default(),
            poll_interval: Duration::from_secs(60),
            nudge: Arc::new(Notify::new()),
            syncing: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Upper bound on how long [`SyncLoop::run`] sleeps between passes
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(10));
        self
    }

    #[must_use]
    pub const fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    #[must_use]
    pub const fn store(&self) -> &CatchStore {
        &self.store
    }

    /// Wake the running loop, e.g. after a new catch was logged.
    pub fn nudge(&self) {
        self.nudge.notify_one();
    }

    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Current worst-first aggregate state.
    pub async fn status(&self) -> Result<SyncState> {
        let records = self.store.status_counts().await?;
        let queue = self.store.queue_counts().await?;
        Ok(SyncState::derive(
            &records,
            &queue,
            self.connectivity.is_online(),
            self.is_syncing(),
        ))
    }

    /// Send every ready operation once, oldest first.
    ///
    /// Each remote commit is raced against connectivity loss. An interrupted
    /// commit is released back to the queue, never marked synced. A transport
    /// failure ends the pass so an unreachable remote is not hammered.
    pub async fn drain_once(&self) -> Result<DrainReport> {
        let mut report = DrainReport::default();
        if !self.connectivity.is_online() {
            report.offline = true;
            return Ok(report);
        }
        if self.syncing.swap(true, Ordering::SeqCst) {
            tracing::debug!("Sync pass already running");
            return Ok(report);
        }
        let guard = SyncingGuard(&self.syncing);

        self.store.emit(LedgerEvent::SyncStarted);
        let mut online = self.connectivity.subscribe();

        loop {
            if !*online.borrow_and_update() {
                report.interrupted = true;
                break;
            }
            let Some(operation) = self.store.begin_next(now_millis()).await? else {
                break;
            };
            tracing::debug!(
                "Sending {} operation {} for catch {}",
                operation.kind,
                operation.id,
                operation.record_id
            );

            let outcome = tokio::select! {
                biased;
                () = wait_until_offline(&mut online) => None,
                result = self.remote.commit(&operation) => Some(result),
            };

            match outcome {
                None => {
                    tracing::info!(
                        "Connectivity lost while sending operation {}; it stays queued",
                        operation.id
                    );
                    self.store.release_operation(&operation).await?;
                    report.interrupted = true;
                    break;
                }
                Some(Ok(ack)) => {
                    if let Err(error) = self.store.complete_operation(&operation, &ack).await {
                        // Unknown local outcome; the operation is sent again later
                        self.release_after_store_error(&operation).await;
                        return Err(error);
                    }
                    report.synced += 1;
                    self.store.emit(LedgerEvent::OperationSynced {
                        operation_id: operation.id,
                        record_id: operation.record_id,
                        kind: operation.kind,
                    });
                }
                Some(Err(error)) => {
                    let attempts = operation.attempts.saturating_add(1);
                    let next_attempt_at = self.backoff.next_attempt_at(now_millis(), attempts);
                    let message = error.to_string();
                    tracing::warn!(
                        "Sync of operation {} failed (attempt {attempts}): {message}",
                        operation.id
                    );
                    if let Err(store_error) = self
                        .store
                        .fail_operation(&operation, &message, next_attempt_at)
                        .await
                    {
                        self.release_after_store_error(&operation).await;
                        return Err(store_error);
                    }
                    report.failed += 1;
                    self.store.emit(LedgerEvent::OperationFailed {
                        operation_id: operation.id,
                        record_id: operation.record_id,
                        kind: operation.kind,
                        error: message,
                    });
                    if error.is_network() {
                        break;
                    }
                }
            }
        }

        drop(guard);
        let state = self.status().await?;
        if report.synced > 0 || report.failed > 0 {
            tracing::info!(
                "Sync pass finished: {} synced, {} failed",
                report.synced,
                report.failed
            );
        }
        self.store.emit(LedgerEvent::SyncFinished {
            synced: report.synced,
            failed: report.failed,
            state,
        });
        Ok(report)
    }

    /// Keep draining until `shutdown` resolves.
    ///
    /// Sleeps while offline, and between passes until the earliest scheduled
    /// retry, a nudge, a connectivity change or the poll interval.
    pub async fn run(&self, shutdown: impl std::future::Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        let mut online = self.connectivity.subscribe();
        let mut last_online = *online.borrow_and_update();

        loop {
            let wait = if last_online {
                if let Err(error) = self.drain_once().await {
                    tracing::warn!("Sync pass failed: {error}");
                }
                Some(self.next_wake().await)
            } else {
                None
            };

            tokio::select! {
                () = &mut shutdown => break,
                () = sleep_or_wait_forever(wait) => {}
                () = self.nudge.notified() => {}
                changed = online.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let now_online = *online.borrow_and_update();
                    if now_online != last_online {
                        last_online = now_online;
                        self.store.emit(LedgerEvent::ConnectivityChanged { online: now_online });
                    }
                }
            }
        }

        tracing::debug!("Sync loop stopped");
        Ok(())
    }

    async fn next_wake(&self) -> Duration {
        match self.store.next_retry_at().await {
            Ok(Some(at)) => {
                let until = u64::try_from(at.saturating_sub(now_millis())).unwrap_or(0);
                Duration::from_millis(until).min(self.poll_interval)
            }
            Ok(None) => self.poll_interval,
            Err(error) => {
                tracing::warn!("Could not read retry schedule: {error}");
                self.poll_interval
            }
        }
    }

    /// Put `operation` back after a local write failed; the original error wins.
    async fn release_after_store_error(&self, operation: &SyncOperation) {
        if let Err(release_error) = self.store.release_operation(operation).await {
            tracing::warn!(
                "Could not release operation {} after a storage error: {release_error}",
                operation.id
            );
        }
    }
}

async fn sleep_or_wait_forever(wait: Option<Duration>) {
    match wait {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}
