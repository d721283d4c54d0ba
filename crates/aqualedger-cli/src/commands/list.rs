use aqualedger_core::db::CatchFilter;
use aqualedger_core::models::SyncStatus;

use crate::cli::StatusFilter;
use crate::commands::common::{
    catch_to_list_item, format_catch_details, format_catch_lines, open_store, resolve_catch,
    CatchListItem,
};
use crate::config::CliSettings;
use crate::error::CliError;

impl From<StatusFilter> for SyncStatus {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::Pending => Self::Pending,
            StatusFilter::Synced => Self::Synced,
            StatusFilter::Error => Self::Error,
        }
    }
}

pub async fn run_list(
    status: Option<StatusFilter>,
    species: Option<String>,
    limit: Option<usize>,
    as_json: bool,
    settings: &CliSettings,
) -> Result<(), CliError> {
    let store = open_store(settings).await?;
    let filter = CatchFilter {
        status: status.map(SyncStatus::from),
        species,
        limit,
    };
    let records = store.list(&filter).await?;

    if as_json {
        let json_items = records
            .iter()
            .map(catch_to_list_item)
            .collect::<Vec<CatchListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if records.is_empty() {
        println!("No catches logged.");
    } else {
        for line in format_catch_lines(&records) {
            println!("{line}");
        }
    }

    Ok(())
}

pub async fn run_show(id: &str, as_json: bool, settings: &CliSettings) -> Result<(), CliError> {
    let store = open_store(settings).await?;
    let record = resolve_catch(&store, id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        for line in format_catch_details(&record) {
            println!("{line}");
        }
    }
    Ok(())
}
