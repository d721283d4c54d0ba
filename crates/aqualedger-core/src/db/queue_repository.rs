//! Sync queue repository implementation

use crate::error::{Error, Result};
use crate::models::{CatchId, OperationKind, OperationPayload, OperationStatus, SyncOperation};
use crate::state::QueueCounts;
use rusqlite::{params, Connection, OptionalExtension};

use super::repository::conversion_error;

const QUEUE_COLUMNS: &str =
    "id, record_id, kind, payload, enqueued_at, status, attempts, next_attempt_at, last_error";

/// Trait for the durable FIFO of not-yet-committed mutations
pub trait SyncQueueRepository {
    /// Append an operation; its id is its position in the FIFO
    fn enqueue(
        &self,
        record_id: &CatchId,
        kind: OperationKind,
        payload: &OperationPayload,
        now_ms: i64,
    ) -> Result<SyncOperation>;

    /// Get an operation by ID
    fn get(&self, id: i64) -> Result<Option<SyncOperation>>;

    /// Oldest operation that may be sent now.
    ///
    /// Only the head operation of each record is eligible, so a record's
    /// operations are never reordered.
    fn next_ready(&self, now_ms: i64) -> Result<Option<SyncOperation>>;

    /// Move a ready operation to `processing`
    fn mark_processing(&self, id: i64) -> Result<()>;

    /// Remove a committed operation
    fn remove(&self, id: i64) -> Result<()>;

    /// Record a failed attempt and schedule the next automatic one
    fn mark_failed(&self, id: i64, error: &str, next_attempt_at: i64) -> Result<SyncOperation>;

    /// Return an interrupted `processing` operation to its prior state
    fn release(&self, id: i64) -> Result<()>;

    /// Release every `processing` operation; returns how many were touched
    fn release_all_processing(&self) -> Result<usize>;

    /// Make failed operations ready now; returns the affected record ids
    fn retry_failed(&self, id: Option<i64>) -> Result<Vec<CatchId>>;

    /// Explicitly drop a failed operation
    fn discard(&self, id: i64) -> Result<SyncOperation>;

    /// All operations in FIFO order
    fn list(&self) -> Result<Vec<SyncOperation>>;

    /// Count operations per status
    fn count_by_status(&self) -> Result<QueueCounts>;

    /// Earliest scheduled automatic retry, if any operation has failed
    fn next_retry_at(&self) -> Result<Option<i64>>;

    /// Whether any operation for `record_id` is still queued
    fn has_operations_for(&self, record_id: &CatchId) -> Result<bool>;
}

/// `SQLite` implementation of `SyncQueueRepository`
pub struct SqliteSyncQueueRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSyncQueueRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse an operation from a database row
    fn parse_operation(row: &rusqlite::Row<'_>) -> rusqlite::Result<SyncOperation> {
        let record_id: String = row.get(1)?;
        let kind: String = row.get(2)?;
        let payload: String = row.get(3)?;
        let status: String = row.get(5)?;

        Ok(SyncOperation {
            id: row.get(0)?,
            record_id: record_id
                .parse()
                .map_err(|error| conversion_error(1, error))?,
            kind: kind.parse().map_err(|error| conversion_error(2, error))?,
            payload: serde_json::from_str(&payload).map_err(|error| conversion_error(3, error))?,
            enqueued_at: row.get(4)?,
            status: status.parse().map_err(|error| conversion_error(5, error))?,
            attempts: row.get(6)?,
            next_attempt_at: row.get(7)?,
            last_error: row.get(8)?,
        })
    }

    fn require(&self, id: i64) -> Result<SyncOperation> {
        self.get(id)?
            .ok_or_else(|| Error::NotFound(format!("sync operation {id}")))
    }
}

impl SyncQueueRepository for SqliteSyncQueueRepository<'_> {
    fn enqueue(
        &self,
        record_id: &CatchId,
        kind: OperationKind,
        payload: &OperationPayload,
        now_ms: i64,
    ) -> Result<SyncOperation> {
        let payload_json = serde_json::to_string(payload)?;
        self.conn.execute(
            "INSERT INTO sync_queue (record_id, kind, payload, enqueued_at, status, attempts, next_attempt_at)
             VALUES (?, ?, ?, ?, 'pending', 0, ?)",
            params![record_id.as_str(), kind.as_str(), payload_json, now_ms, now_ms],
        )?;

        Ok(SyncOperation {
            id: self.conn.last_insert_rowid(),
            record_id: *record_id,
            kind,
            payload: payload.clone(),
            enqueued_at: now_ms,
            status: OperationStatus::Pending,
            attempts: 0,
            next_attempt_at: now_ms,
            last_error: None,
        })
    }

    fn get(&self, id: i64) -> Result<Option<SyncOperation>> {
        let operation = self
            .conn
            .query_row(
                &format!("SELECT {QUEUE_COLUMNS} FROM sync_queue WHERE id = ?"),
                params![id],
                Self::parse_operation,
            )
            .optional()?;
        Ok(operation)
    }

    fn next_ready(&self, now_ms: i64) -> Result<Option<SyncOperation>> {
        let operation = self
            .conn
            .query_row(
                &format!(
                    "SELECT {QUEUE_COLUMNS}
                     FROM sync_queue
                     WHERE id IN (SELECT MIN(id) FROM sync_queue GROUP BY record_id)
                       AND (status = 'pending' OR (status = 'failed' AND next_attempt_at <= ?))
                     ORDER BY id
                     LIMIT 1"
                ),
                params![now_ms],
                Self::parse_operation,
            )
            .optional()?;
        Ok(operation)
    }

    fn mark_processing(&self, id: i64) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE sync_queue SET status = 'processing' WHERE id = ? AND status IN ('pending', 'failed')",
            params![id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("ready sync operation {id}")));
        }
        Ok(())
    }

    fn remove(&self, id: i64) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM sync_queue WHERE id = ?", params![id])?;
        if rows == 0 {
            return Err(Error::NotFound(format!("sync operation {id}")));
        }
        Ok(())
    }

    fn mark_failed(&self, id: i64, error: &str, next_attempt_at: i64) -> Result<SyncOperation> {
        let rows = self.conn.execute(
            "UPDATE sync_queue
             SET status = 'failed', attempts = attempts + 1, next_attempt_at = ?, last_error = ?
             WHERE id = ?",
            params![next_attempt_at, error, id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("sync operation {id}")));
        }
        self.require(id)
    }

    fn release(&self, id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE sync_queue
             SET status = CASE WHEN attempts = 0 THEN 'pending' ELSE 'failed' END
             WHERE id = ? AND status = 'processing'",
            params![id],
        )?;
        Ok(())
    }

    fn release_all_processing(&self) -> Result<usize> {
        let rows = self.conn.execute(
            "UPDATE sync_queue
             SET status = CASE WHEN attempts = 0 THEN 'pending' ELSE 'failed' END
             WHERE status = 'processing'",
            [],
        )?;
        Ok(rows)
    }

    fn retry_failed(&self, id: Option<i64>) -> Result<Vec<CatchId>> {
        if let Some(id) = id {
            let operation = self.require(id)?;
            if operation.status != OperationStatus::Failed {
                return Err(Error::InvalidInput(format!(
                    "sync operation {id} is {}, only failed operations can be retried",
                    operation.status
                )));
            }
        }

        let mut stmt = self.conn.prepare(
            "UPDATE sync_queue
             SET status = 'pending', next_attempt_at = 0
             WHERE status = 'failed' AND (?1 IS NULL OR id = ?1)
             RETURNING record_id",
        )?;
        let ids = stmt
            .query_map(params![id], |row| {
                let record_id: String = row.get(0)?;
                record_id
                    .parse::<CatchId>()
                    .map_err(|error| conversion_error(0, error))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn discard(&self, id: i64) -> Result<SyncOperation> {
        let operation = self.require(id)?;
        if operation.status != OperationStatus::Failed {
            return Err(Error::InvalidInput(format!(
                "sync operation {id} is {}, only failed operations can be discarded",
                operation.status
            )));
        }
        self.remove(id)?;
        Ok(operation)
    }

    fn list(&self) -> Result<Vec<SyncOperation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {QUEUE_COLUMNS} FROM sync_queue ORDER BY id"))?;
        let operations = stmt
            .query_map([], Self::parse_operation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(operations)
    }

    fn count_by_status(&self) -> Result<QueueCounts> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM sync_queue GROUP BY status")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut counts = QueueCounts::default();
        for (status, count) in rows {
            match status.parse::<OperationStatus>()? {
                OperationStatus::Pending => counts.pending = count,
                OperationStatus::Processing => counts.processing = count,
                OperationStatus::Failed => counts.failed = count,
            }
        }
        Ok(counts)
    }

    fn next_retry_at(&self) -> Result<Option<i64>> {
        let next = self.conn.query_row(
            "SELECT MIN(next_attempt_at) FROM sync_queue WHERE status = 'failed'",
            [],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    fn has_operations_for(&self, record_id: &CatchId) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sync_queue WHERE record_id = ?)",
            params![record_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}
