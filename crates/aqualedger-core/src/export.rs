//! Catch export helpers shared by all clients.

use std::fmt::Write as _;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::CatchRecord;

/// Export output format shared by all clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Serializable catch representation used in JSON and Markdown exports.
///
/// Photos are left out; only whether one exists is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCatch {
    pub id: String,
    pub species: String,
    /// `None` when the weight was never entered
    pub weight_kg: Option<f64>,
    pub timestamp: i64,
    /// Capture time as RFC 3339
    pub captured_at: String,
    pub sync_status: String,
    pub score: Option<u8>,
    pub rationale: Option<String>,
    pub has_photo: bool,
    pub compliance_warning: bool,
    pub compliance_details: Option<String>,
}

/// Convert a catch into an export record.
#[must_use]
pub fn catch_to_export_item(record: &CatchRecord) -> ExportCatch {
    ExportCatch {
        id: record.id.to_string(),
        species: record.species.clone(),
        weight_kg: (!record.has_unknown_weight()).then_some(record.weight_kg),
        timestamp: record.timestamp,
        captured_at: format_timestamp(record.timestamp),
        sync_status: record.sync_status.to_string(),
        score: record.score(),
        rationale: record.rationale().map(ToString::to_string),
        has_photo: record.image_base64.is_some(),
        compliance_warning: record.compliance_warning,
        compliance_details: record.compliance_details.clone(),
    }
}

/// Render catches as pretty-printed JSON.
pub fn render_json_export(records: &[CatchRecord]) -> serde_json::Result<String> {
    let items = records
        .iter()
        .map(catch_to_export_item)
        .collect::<Vec<ExportCatch>>();
    serde_json::to_string_pretty(&items)
}

/// Render catches as a Markdown catch log.
#[must_use]
pub fn render_markdown_export(records: &[CatchRecord]) -> String {
    let mut output = String::from("# Catch log\n");

    for record in records {
        let item = catch_to_export_item(record);
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", item.species);
        let _ = writeln!(output);
        let _ = writeln!(output, "- id: {}", item.id);
        let _ = writeln!(output, "- captured: {}", item.captured_at);
        match item.weight_kg {
            Some(weight) => {
                let _ = writeln!(output, "- weight: {weight} kg");
            }
            None => {
                let _ = writeln!(output, "- weight: unknown");
            }
        }
        let _ = writeln!(output, "- sync: {}", item.sync_status);
        if let (Some(score), Some(rationale)) = (item.score, &item.rationale) {
            let _ = writeln!(output, "- sustainability: {score}/100 ({rationale})");
        }
        if item.compliance_warning {
            let _ = writeln!(
                output,
                "- compliance warning: {}",
                item.compliance_details.as_deref().unwrap_or("see regulations")
            );
        }
    }

    output
}

/// Render catches based on selected export format.
pub fn render_catches_export(
    records: &[CatchRecord],
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(records),
        ExportFormat::Markdown => Ok(render_markdown_export(records)),
    }
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("aqualedger-export-{timestamp_ms}.{}", format.extension())
}

/// Format Unix milliseconds as RFC 3339 (UTC), falling back to the raw value.
#[must_use]
pub fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map_or_else(
            || timestamp_ms.to_string(),
            |time| time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        )
}
