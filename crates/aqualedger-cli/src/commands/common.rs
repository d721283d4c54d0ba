use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use aqualedger_core::events::LedgerEvent;
use aqualedger_core::models::{CatchId, CatchRecord, SyncOperation};
use aqualedger_core::services::CatchStore;
use chrono::Utc;
use serde::Serialize;

use crate::config::CliSettings;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct CatchListItem {
    pub id: String,
    pub species: String,
    pub weight_kg: Option<f64>,
    pub timestamp: i64,
    pub relative_time: String,
    pub sync_status: String,
    pub score: Option<u8>,
    pub rationale: Option<String>,
    pub compliance_warning: bool,
    pub compliance_details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OperationListItem {
    pub id: i64,
    pub record_id: String,
    pub kind: String,
    pub status: String,
    pub enqueued_at: i64,
    pub attempts: u32,
    pub next_attempt_at: i64,
    pub last_error: Option<String>,
}

/// Open the catch store and print its notifications to stderr
pub async fn open_store(settings: &CliSettings) -> Result<CatchStore, CliError> {
    let store = CatchStore::open_path(&settings.db_path).await?;
    Ok(store.with_events(Arc::new(print_event)))
}

pub fn print_event(event: LedgerEvent) {
    match event {
        LedgerEvent::WeightMissing { id, species } => {
            eprintln!(
                "No weight heard for {species}. Enter it with `aqualedger edit {} --weight <kg>`",
                short_id(&id)
            );
        }
        LedgerEvent::VoiceListening => eprintln!("Listening... (Ctrl-C to cancel)"),
        LedgerEvent::VoiceCancelled => eprintln!("Listening cancelled"),
        LedgerEvent::OperationFailed {
            operation_id,
            kind,
            error,
            ..
        } => {
            eprintln!("Sync of operation {operation_id} ({kind}) failed: {error}");
        }
        LedgerEvent::ConnectivityChanged { online } => {
            eprintln!("{}", if online { "Back online" } else { "Offline" });
        }
        other => tracing::debug!("{other:?}"),
    }
}

pub async fn resolve_catch(store: &CatchStore, raw_id: &str) -> Result<CatchRecord, CliError> {
    let normalized_id = normalize_catch_identifier(raw_id)?;
    let id = store.resolve_id(&normalized_id).await?;
    store
        .get(&id)
        .await?
        .ok_or_else(|| aqualedger_core::Error::NotFound(normalized_id).into())
}

pub fn normalize_catch_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyCatchId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn short_id(id: &CatchId) -> String {
    id.to_string().chars().take(13).collect()
}

pub fn format_weight(record: &CatchRecord) -> String {
    if record.has_unknown_weight() {
        "? kg".to_string()
    } else {
        format!("{} kg", record.weight_kg)
    }
}

pub fn format_catch_lines(records: &[CatchRecord]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    records
        .iter()
        .map(|record| {
            let score = record
                .score()
                .map_or_else(|| "-".to_string(), |score| format!("{score}/100"));
            let relative_time = format_relative_time(record.timestamp, now_ms);
            let species = truncate(&record.species, 28);
            let line = format!(
                "{:<13}  {species:<28}  {:>9}  {score:>7}  {:<7}  {relative_time}",
                short_id(&record.id),
                format_weight(record),
                record.sync_status.as_str(),
            );
            if record.compliance_warning {
                format!("{line}  !")
            } else {
                line
            }
        })
        .collect()
}

pub fn format_catch_details(record: &CatchRecord) -> Vec<String> {
    let mut lines = vec![
        format!("id:         {}", record.id),
        format!("species:    {}", record.species),
        format!("weight:     {}", format_weight(record)),
        format!("caught:     {}", format_timestamp(record.timestamp)),
        format!("sync:       {}", record.sync_status),
    ];
    if let (Some(score), Some(rationale)) = (record.score(), record.rationale()) {
        lines.push(format!("score:      {score}/100"));
        lines.push(format!("rationale:  {rationale}"));
    }
    if record.image_base64.is_some() {
        lines.push("photo:      attached".to_string());
    }
    if record.compliance_warning {
        lines.push(format!(
            "compliance: {}",
            record
                .compliance_details
                .as_deref()
                .unwrap_or("possible regulation breach")
        ));
    }
    lines
}

pub fn catch_to_list_item(record: &CatchRecord) -> CatchListItem {
    let now_ms = Utc::now().timestamp_millis();
    CatchListItem {
        id: record.id.to_string(),
        species: record.species.clone(),
        weight_kg: (!record.has_unknown_weight()).then_some(record.weight_kg),
        timestamp: record.timestamp,
        relative_time: format_relative_time(record.timestamp, now_ms),
        sync_status: record.sync_status.to_string(),
        score: record.score(),
        rationale: record.rationale().map(ToString::to_string),
        compliance_warning: record.compliance_warning,
        compliance_details: record.compliance_details.clone(),
    }
}

pub fn operation_to_list_item(operation: &SyncOperation) -> OperationListItem {
    OperationListItem {
        id: operation.id,
        record_id: operation.record_id.to_string(),
        kind: operation.kind.to_string(),
        status: operation.status.to_string(),
        enqueued_at: operation.enqueued_at,
        attempts: operation.attempts,
        next_attempt_at: operation.next_attempt_at,
        last_error: operation.last_error.clone(),
    }
}

pub fn format_operation_lines(operations: &[SyncOperation]) -> Vec<String> {
    operations
        .iter()
        .map(|operation| {
            let mut line = format!(
                "{:>5}  {:<6}  {:<10}  catch={}  attempts={}",
                operation.id,
                operation.kind.as_str(),
                operation.status.as_str(),
                short_id(&operation.record_id),
                operation.attempts,
            );
            if let Some(error) = &operation.last_error {
                line.push_str("  error=");
                line.push_str(error);
            }
            line
        })
        .collect()
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut truncated = text
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Join argument words, falling back to piped stdin
pub fn resolve_text(parts: &[String]) -> Result<String, CliError> {
    if let Some(text) = normalize_text(&parts.join(" ")) {
        return Ok(text);
    }

    if let Some(text) = read_piped_stdin()? {
        return Ok(text);
    }

    Err(CliError::EmptyText)
}

pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_text(&buffer))
}
