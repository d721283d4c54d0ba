//! Durable catch store with its sync queue.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{
    CatchFilter, CatchRepository, Database, SqliteCatchRepository, SqliteSyncQueueRepository,
    SyncQueueRepository,
};
use crate::events::{EventSink, LedgerEvent, NoopSink};
use crate::models::{
    CatchId, CatchPatch, CatchRecord, NewCatch, OperationKind, OperationPayload, OperationStatus,
    RemoteAck, SyncOperation, SyncStatus,
};
use crate::state::{QueueCounts, StatusCounts};
use crate::util::now_millis;
use crate::{Error, Result};

/// Single source of truth for catches and their pending remote mutations.
///
/// Every mutation writes the record and its queue entry in one transaction,
/// so a failure leaves both untouched. `SQLite` work runs on the blocking
/// pool while the lock is held; the lock is never held across a remote
/// request.
#[derive(Clone)]
pub struct CatchStore {
    db: Arc<Mutex<Database>>,
    events: Arc<dyn EventSink>,
}

impl CatchStore {
    /// Open a store at the given filesystem path.
    ///
    /// Operations left `processing` by a previous crash are released: their
    /// remote result is unknown, so they will be sent again.
    pub async fn open_path(db_path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = db_path.as_ref().to_path_buf();
        let (db, released) = tokio::task::spawn_blocking(move || -> Result<(Database, usize)> {
            let db = Database::open(path)?;
            let released =
                SqliteSyncQueueRepository::new(db.connection()).release_all_processing()?;
            Ok((db, released))
        })
        .await
        .map_err(std::io::Error::from)??;

        if released > 0 {
            tracing::warn!("Released {released} interrupted sync operation(s) from a previous run");
        }
        Ok(Self::from_database(db))
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            events: Arc::new(NoopSink),
        }
    }

    /// Route notifications to `sink`.
    #[must_use]
    pub fn with_events(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    pub(crate) fn emit(&self, event: LedgerEvent) {
        self.events.emit(event);
    }

    /// Run `work` against the database on the blocking pool.
    async fn with_db<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db).lock_owned().await;
        tokio::task::spawn_blocking(move || work(&db))
            .await
            .map_err(std::io::Error::from)?
    }

    /// Persist a new catch and queue its `create` operation.
    ///
    /// Returns once both are durable. The record starts `pending`.
    pub async fn insert(&self, draft: NewCatch) -> Result<CatchRecord> {
        let now = now_millis();
        let record = draft.into_record(CatchId::new(), now)?;

        let stored = record.clone();
        self.with_db(move |db| {
            let tx = db.connection().unchecked_transaction()?;
            SqliteCatchRepository::new(&tx).insert(&stored)?;
            SqliteSyncQueueRepository::new(&tx).enqueue(
                &stored.id,
                OperationKind::Create,
                &OperationPayload::Record(stored.clone()),
                now,
            )?;
            tx.commit()?;
            Ok(())
        })
        .await?;

        tracing::info!("Saved catch {} ({})", record.id, record.species);
        self.emit(LedgerEvent::CatchSaved {
            id: record.id,
            species: record.species.clone(),
        });
        Ok(record)
    }

    /// Merge `patch` into a stored catch and queue the full resulting record.
    ///
    /// A synced record goes back to `pending`; a record in `error` stays there
    /// until its failed operation is resolved.
    pub async fn update(&self, id: &CatchId, patch: &CatchPatch) -> Result<CatchRecord> {
        if patch.is_empty() {
            return Err(Error::InvalidInput("nothing to update".into()));
        }

        let id = *id;
        let patch = patch.clone();
        let updated = self
            .with_db(move |db| {
                let tx = db.connection().unchecked_transaction()?;
                let catches = SqliteCatchRepository::new(&tx);

                let current = catches
                    .get(&id)?
                    .ok_or_else(|| Error::NotFound(id.to_string()))?;
                let mut updated = patch.apply_to(&current)?;
                if current.sync_status == SyncStatus::Error {
                    updated.sync_status = SyncStatus::Error;
                }

                catches.replace(&updated)?;
                SqliteSyncQueueRepository::new(&tx).enqueue(
                    &id,
                    OperationKind::Update,
                    &OperationPayload::Record(updated.clone()),
                    now_millis(),
                )?;
                tx.commit()?;
                Ok(updated)
            })
            .await?;

        tracing::info!("Updated catch {id}");
        self.emit(LedgerEvent::CatchUpdated { id });
        Ok(updated)
    }

    /// Remove a catch and queue its `delete` operation.
    ///
    /// The record disappears from reads immediately.
    pub async fn delete(&self, id: &CatchId) -> Result<()> {
        let id = *id;
        self.with_db(move |db| {
            let tx = db.connection().unchecked_transaction()?;
            SqliteCatchRepository::new(&tx).delete(&id)?;
            SqliteSyncQueueRepository::new(&tx).enqueue(
                &id,
                OperationKind::Delete,
                &OperationPayload::Removed(id),
                now_millis(),
            )?;
            tx.commit()?;
            Ok(())
        })
        .await?;

        tracing::info!("Deleted catch {id}");
        self.emit(LedgerEvent::CatchDeleted { id });
        Ok(())
    }

    /// Catches newest first, optionally only those with `status`.
    pub async fn query(&self, status: Option<SyncStatus>) -> Result<Vec<CatchRecord>> {
        self.list(&CatchFilter {
            status,
            ..CatchFilter::default()
        })
        .await
    }

    /// Catches newest first, filtered.
    pub async fn list(&self, filter: &CatchFilter) -> Result<Vec<CatchRecord>> {
        let filter = filter.clone();
        self.with_db(move |db| SqliteCatchRepository::new(db.connection()).list(&filter))
            .await
    }

    /// Fetch a catch by id.
    pub async fn get(&self, id: &CatchId) -> Result<Option<CatchRecord>> {
        let id = *id;
        self.with_db(move |db| SqliteCatchRepository::new(db.connection()).get(&id))
            .await
    }

    /// Resolve a full id or a unique id prefix.
    pub async fn resolve_id(&self, raw: &str) -> Result<CatchId> {
        let raw = raw.trim().to_string();
        if let Ok(id) = raw.parse::<CatchId>() {
            return Ok(id);
        }

        let prefix = raw.clone();
        let matches = self
            .with_db(move |db| SqliteCatchRepository::new(db.connection()).ids_with_prefix(&prefix))
            .await?;
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(Error::NotFound(format!("no catch matches '{raw}'"))),
            _ => Err(Error::InvalidInput(format!(
                "'{raw}' matches {} catches, use a longer prefix",
                matches.len()
            ))),
        }
    }

    /// Record counts per sync status.
    pub async fn status_counts(&self) -> Result<StatusCounts> {
        self.with_db(|db| SqliteCatchRepository::new(db.connection()).count_by_status())
            .await
    }

    /// Queue entry counts per status.
    pub async fn queue_counts(&self) -> Result<QueueCounts> {
        self.with_db(|db| SqliteSyncQueueRepository::new(db.connection()).count_by_status())
            .await
    }

    /// Queued operations in FIFO order.
    pub async fn operations(&self) -> Result<Vec<SyncOperation>> {
        self.with_db(|db| SqliteSyncQueueRepository::new(db.connection()).list())
            .await
    }

    /// Make failed operations ready now (one, or all when `id` is `None`).
    ///
    /// Their records move from `error` back to `pending`.
    pub async fn retry_failed(&self, id: Option<i64>) -> Result<usize> {
        let retried = self
            .with_db(move |db| {
                let tx = db.connection().unchecked_transaction()?;
                let record_ids = SqliteSyncQueueRepository::new(&tx).retry_failed(id)?;
                let catches = SqliteCatchRepository::new(&tx);
                for record_id in &record_ids {
                    catches.set_sync_status(record_id, SyncStatus::Pending)?;
                }
                tx.commit()?;
                Ok(record_ids.len())
            })
            .await?;

        tracing::info!("Queued {retried} failed operation(s) for retry");
        Ok(retried)
    }

    /// Explicitly drop a failed operation without sending it.
    ///
    /// The local record is kept. It goes back to `pending` when later
    /// operations for it remain, and to `synced` when nothing is left to send.
    pub async fn discard_operation(&self, id: i64) -> Result<SyncOperation> {
        let operation = self
            .with_db(move |db| {
                let tx = db.connection().unchecked_transaction()?;
                let queue = SqliteSyncQueueRepository::new(&tx);
                let operation = queue.discard(id)?;
                let status = if queue.has_operations_for(&operation.record_id)? {
                    SyncStatus::Pending
                } else {
                    SyncStatus::Synced
                };
                SqliteCatchRepository::new(&tx).set_sync_status(&operation.record_id, status)?;
                tx.commit()?;
                Ok(operation)
            })
            .await?;

        tracing::warn!(
            "Discarded failed {} operation {} for catch {}",
            operation.kind,
            operation.id,
            operation.record_id
        );
        Ok(operation)
    }

    /// Claim the next ready operation, marking it `processing`.
    pub async fn begin_next(&self, now_ms: i64) -> Result<Option<SyncOperation>> {
        self.with_db(move |db| {
            let tx = db.connection().unchecked_transaction()?;
            let queue = SqliteSyncQueueRepository::new(&tx);

            let Some(mut operation) = queue.next_ready(now_ms)? else {
                return Ok(None);
            };
            queue.mark_processing(operation.id)?;
            tx.commit()?;

            operation.status = OperationStatus::Processing;
            Ok(Some(operation))
        })
        .await
    }

    /// The remote ledger accepted `operation`.
    ///
    /// Removes it from the queue, applies the authoritative assessment, and
    /// marks the record `synced` once nothing else is queued for it.
    pub async fn complete_operation(
        &self,
        operation: &SyncOperation,
        ack: &RemoteAck,
    ) -> Result<()> {
        let operation = operation.clone();
        let ack = ack.clone();
        self.with_db(move |db| {
            let tx = db.connection().unchecked_transaction()?;
            let queue = SqliteSyncQueueRepository::new(&tx);
            let catches = SqliteCatchRepository::new(&tx);

            queue.remove(operation.id)?;
            if operation.kind != OperationKind::Delete {
                catches.apply_ack(&operation.record_id, &ack)?;
            }
            let status = if queue.has_operations_for(&operation.record_id)? {
                SyncStatus::Pending
            } else {
                SyncStatus::Synced
            };
            catches.set_sync_status(&operation.record_id, status)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// The remote commit failed; keep the operation and flag its record.
    pub async fn fail_operation(
        &self,
        operation: &SyncOperation,
        error: &str,
        next_attempt_at: i64,
    ) -> Result<SyncOperation> {
        let operation_id = operation.id;
        let record_id = operation.record_id;
        let error = error.to_string();
        self.with_db(move |db| {
            let tx = db.connection().unchecked_transaction()?;
            let failed = SqliteSyncQueueRepository::new(&tx).mark_failed(
                operation_id,
                &error,
                next_attempt_at,
            )?;
            SqliteCatchRepository::new(&tx).set_sync_status(&record_id, SyncStatus::Error)?;
            tx.commit()?;
            Ok(failed)
        })
        .await
    }

    /// The attempt was interrupted before a result was known.
    pub async fn release_operation(&self, operation: &SyncOperation) -> Result<()> {
        let operation_id = operation.id;
        self.with_db(move |db| SqliteSyncQueueRepository::new(db.connection()).release(operation_id))
            .await
    }

    /// Earliest scheduled automatic retry.
    pub async fn next_retry_at(&self) -> Result<Option<i64>> {
        self.with_db(|db| SqliteSyncQueueRepository::new(db.connection()).next_retry_at())
            .await
    }
}
