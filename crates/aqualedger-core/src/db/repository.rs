//! Catch repository implementation

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT

use crate::error::{Error, Result};
use crate::models::{Assessment, CatchId, CatchRecord, RemoteAck, SyncStatus};
use crate::state::StatusCounts;
use rusqlite::{params, Connection, OptionalExtension};

const CATCH_COLUMNS: &str = "id, species, weight_kg, timestamp, sync_status, score, rationale, \
     image_base64, compliance_warning, compliance_details";

/// Filter for listing catches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchFilter {
    pub status: Option<SyncStatus>,
    /// Case-insensitive species substring
    pub species: Option<String>,
    pub limit: Option<usize>,
}

impl CatchFilter {
    #[must_use]
    pub fn with_status(status: SyncStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Trait for catch storage operations
pub trait CatchRepository {
    /// Persist a new record
    fn insert(&self, record: &CatchRecord) -> Result<()>;

    /// Get a record by ID
    fn get(&self, id: &CatchId) -> Result<Option<CatchRecord>>;

    /// List records, newest capture first
    fn list(&self, filter: &CatchFilter) -> Result<Vec<CatchRecord>>;

    /// Overwrite every mutable column of an existing record
    fn replace(&self, record: &CatchRecord) -> Result<()>;

    /// Hard delete a record
    fn delete(&self, id: &CatchId) -> Result<()>;

    /// Set the sync status; returns false when the record no longer exists
    fn set_sync_status(&self, id: &CatchId, status: SyncStatus) -> Result<bool>;

    /// Store the authoritative assessment and compliance flags from the ledger
    fn apply_ack(&self, id: &CatchId, ack: &RemoteAck) -> Result<bool>;

    /// Count records per sync status
    fn count_by_status(&self) -> Result<StatusCounts>;

    /// IDs whose textual form starts with `prefix`
    fn ids_with_prefix(&self, prefix: &str) -> Result<Vec<CatchId>>;
}

/// `SQLite` implementation of `CatchRepository`
pub struct SqliteCatchRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteCatchRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a catch from a database row
    fn parse_catch(row: &rusqlite::Row<'_>) -> rusqlite::Result<CatchRecord> {
        let id: String = row.get(0)?;
        let status: String = row.get(4)?;
        let score: Option<u8> = row.get(5)?;
        let rationale: Option<String> = row.get(6)?;

        Ok(CatchRecord {
            id: id.parse().map_err(|error| conversion_error(0, error))?,
            species: row.get(1)?,
            weight_kg: row.get(2)?,
            timestamp: row.get(3)?,
            sync_status: status.parse().map_err(|error| conversion_error(4, error))?,
            assessment: score
                .zip(rationale)
                .map(|(score, rationale)| Assessment::new(score, rationale)),
            image_base64: row.get(7)?,
            compliance_warning: row.get(8)?,
            compliance_details: row.get(9)?,
        })
    }
}

pub(super) fn conversion_error<E>(column: usize, error: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(error),
    )
}

impl CatchRepository for SqliteCatchRepository<'_> {
    fn insert(&self, record: &CatchRecord) -> Result<()> {
        self.conn.execute(
            &format!("INSERT INTO catches ({CATCH_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                record.id.as_str(),
                record.species,
                record.weight_kg,
                record.timestamp,
                record.sync_status.as_str(),
                record.score(),
                record.rationale(),
                record.image_base64,
                record.compliance_warning,
                record.compliance_details,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &CatchId) -> Result<Option<CatchRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {CATCH_COLUMNS} FROM catches WHERE id = ?"),
                params![id.as_str()],
                Self::parse_catch,
            )
            .optional()?;
        Ok(record)
    }

    fn list(&self, filter: &CatchFilter) -> Result<Vec<CatchRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATCH_COLUMNS}
             FROM catches
             WHERE (?1 IS NULL OR sync_status = ?1)
               AND (?2 IS NULL OR instr(lower(species), lower(?2)) > 0)
             ORDER BY timestamp DESC, id DESC
             LIMIT ?3"
        ))?;

        let species = filter
            .species
            .as_deref()
            .map(str::trim)
            .filter(|species| !species.is_empty());
        let limit = filter.limit.map_or(-1, |limit| limit as i64);

        let records = stmt
            .query_map(
                params![filter.status.map(SyncStatus::as_str), species, limit],
                Self::parse_catch,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn replace(&self, record: &CatchRecord) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE catches
             SET species = ?, weight_kg = ?, sync_status = ?, score = ?, rationale = ?,
                 image_base64 = ?, compliance_warning = ?, compliance_details = ?
             WHERE id = ?",
            params![
                record.species,
                record.weight_kg,
                record.sync_status.as_str(),
                record.score(),
                record.rationale(),
                record.image_base64,
                record.compliance_warning,
                record.compliance_details,
                record.id.as_str(),
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(record.id.to_string()));
        }
        Ok(())
    }

    fn delete(&self, id: &CatchId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM catches WHERE id = ?", params![id.as_str()])?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn set_sync_status(&self, id: &CatchId, status: SyncStatus) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE catches SET sync_status = ? WHERE id = ?",
            params![status.as_str(), id.as_str()],
        )?;
        Ok(rows > 0)
    }

    fn apply_ack(&self, id: &CatchId, ack: &RemoteAck) -> Result<bool> {
        let mut touched = false;

        if let Some(assessment) = &ack.assessment {
            // Score and rationale are replaced in one statement
            let rows = self.conn.execute(
                "UPDATE catches SET score = ?, rationale = ? WHERE id = ?",
                params![assessment.score, assessment.rationale, id.as_str()],
            )?;
            touched |= rows > 0;
        }

        if let Some(compliance) = &ack.compliance {
            let rows = self.conn.execute(
                "UPDATE catches SET compliance_warning = ?, compliance_details = ? WHERE id = ?",
                params![compliance.warning, compliance.details, id.as_str()],
            )?;
            touched |= rows > 0;
        }

        Ok(touched)
    }

    fn count_by_status(&self) -> Result<StatusCounts> {
        let mut stmt = self
            .conn
            .prepare("SELECT sync_status, COUNT(*) FROM catches GROUP BY sync_status")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status.parse::<SyncStatus>()? {
                SyncStatus::Pending => counts.pending = count,
                SyncStatus::Synced => counts.synced = count,
                SyncStatus::Error => counts.error = count,
            }
        }
        Ok(counts)
    }

    fn ids_with_prefix(&self, prefix: &str) -> Result<Vec<CatchId>> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id FROM catches WHERE substr(id, 1, length(?1)) = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![prefix], |row| {
                let id: String = row.get(0)?;
                id.parse::<CatchId>()
                    .map_err(|error| conversion_error(0, error))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{ComplianceNotice, NewCatch};
    use pretty_assertions::assert_eq;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn record(species: &str, timestamp: i64) -> CatchRecord {
        NewCatch::new(species, 2.0)
            .with_assessment(Assessment::new(60, "local estimate"))
            .into_record(CatchId::new(), timestamp)
            .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup();
        let repo = SqliteCatchRepository::new(db.connection());

        let catch = record("Tuna", 10);
        repo.insert(&catch).unwrap();

        let fetched = repo.get(&catch.id).unwrap().unwrap();
        assert_eq!(fetched, catch);
        assert!(repo.get(&CatchId::new()).unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first_and_filtered() {
        let db = setup();
        let repo = SqliteCatchRepository::new(db.connection());

        let old = record("Cod", 100);
        let new = record("Sea Bass", 300);
        let middle = record("Bass", 200);
        for catch in [&old, &new, &middle] {
            repo.insert(catch).unwrap();
        }
        repo.set_sync_status(&old.id, SyncStatus::Synced).unwrap();

        let all = repo.list(&CatchFilter::default()).unwrap();
        let timestamps: Vec<i64> = all.iter().map(|catch| catch.timestamp).collect();
        assert_eq!(timestamps, vec![300, 200, 100]);

        let pending = repo
            .list(&CatchFilter::with_status(SyncStatus::Pending))
            .unwrap();
        assert_eq!(pending.len(), 2);

        let bass = repo
            .list(&CatchFilter {
                species: Some("BASS".to_string()),
                limit: Some(1),
                ..CatchFilter::default()
            })
            .unwrap();
        assert_eq!(bass.len(), 1);
        assert_eq!(bass[0].id, new.id);
    }

    #[test]
    fn test_replace_and_delete() {
        let db = setup();
        let repo = SqliteCatchRepository::new(db.connection());

        let mut catch = record("Pike", 1);
        repo.insert(&catch).unwrap();

        catch.species = "Northern Pike".to_string();
        catch.image_base64 = Some("aGVsbG8=".to_string());
        repo.replace(&catch).unwrap();
        assert_eq!(repo.get(&catch.id).unwrap().unwrap(), catch);

        repo.delete(&catch.id).unwrap();
        assert!(repo.get(&catch.id).unwrap().is_none());
        assert!(matches!(repo.delete(&catch.id), Err(Error::NotFound(_))));
        assert!(matches!(repo.replace(&catch), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_apply_ack_replaces_assessment_and_compliance() {
        let db = setup();
        let repo = SqliteCatchRepository::new(db.connection());

        let catch = record("Eel", 1);
        repo.insert(&catch).unwrap();

        let ack = RemoteAck {
            assessment: Some(Assessment::new(12, "critically endangered")),
            compliance: Some(ComplianceNotice {
                warning: true,
                details: Some("closed season".to_string()),
            }),
        };
        assert!(repo.apply_ack(&catch.id, &ack).unwrap());

        let fetched = repo.get(&catch.id).unwrap().unwrap();
        assert_eq!(fetched.score(), Some(12));
        assert_eq!(fetched.rationale(), Some("critically endangered"));
        assert!(fetched.compliance_warning);
        assert_eq!(fetched.compliance_details.as_deref(), Some("closed season"));

        assert!(!repo.apply_ack(&catch.id, &RemoteAck::bare()).unwrap());
    }

    #[test]
    fn test_count_by_status() {
        let db = setup();
        let repo = SqliteCatchRepository::new(db.connection());

        let first = record("Carp", 1);
        let second = record("Carp", 2);
        repo.insert(&first).unwrap();
        repo.insert(&second).unwrap();
        repo.set_sync_status(&second.id, SyncStatus::Error).unwrap();

        assert_eq!(
            repo.count_by_status().unwrap(),
            StatusCounts {
                pending: 1,
                synced: 0,
                error: 1,
            }
        );
    }

    #[test]
    fn test_ids_with_prefix() {
        let db = setup();
        let repo = SqliteCatchRepository::new(db.connection());

        let catch = record("Trout", 1);
        repo.insert(&catch).unwrap();

        let full_id = catch.id.as_str();
        let prefix = &full_id[..8];
        assert_eq!(repo.ids_with_prefix(prefix).unwrap(), vec![catch.id]);
        assert_eq!(
            repo.ids_with_prefix(&prefix.to_uppercase()).unwrap(),
            vec![catch.id]
        );
        assert!(repo.ids_with_prefix("").unwrap().is_empty());
        assert!(repo.ids_with_prefix("zzzz").unwrap().is_empty());
    }
}
