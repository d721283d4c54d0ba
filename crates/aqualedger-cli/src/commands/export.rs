use std::path::{Path, PathBuf};

use aqualedger_core::export::{render_catches_export, suggested_export_file_name};
use aqualedger_core::util::now_millis;

use crate::cli::ExportFormat;
use crate::commands::common::open_store;
use crate::config::CliSettings;
use crate::error::CliError;

impl From<ExportFormat> for aqualedger_core::export::ExportFormat {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

pub async fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    settings: &CliSettings,
) -> Result<(), CliError> {
    let store = open_store(settings).await?;
    let records = store.query(None).await?;
    let format = aqualedger_core::export::ExportFormat::from(format);
    let rendered = render_catches_export(&records, format)?;

    if let Some(path) = output_path {
        let path = resolve_export_path(path, format);
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// Directories get a timestamped file name inside them
pub fn resolve_export_path(path: &Path, format: aqualedger_core::export::ExportFormat) -> PathBuf {
    if path.is_dir() {
        path.join(suggested_export_file_name(format, now_millis()))
    } else {
        path.to_path_buf()
    }
}
