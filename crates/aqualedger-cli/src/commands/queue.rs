use crate::cli::QueueCommands;
use crate::commands::common::{
    format_operation_lines, open_store, operation_to_list_item, OperationListItem,
};
use crate::config::CliSettings;
use crate::error::CliError;

pub async fn run_queue(command: QueueCommands, settings: &CliSettings) -> Result<(), CliError> {
    let store = open_store(settings).await?;

    match command {
        QueueCommands::List { json } => {
            let operations = store.operations().await?;
            if json {
                let json_items = operations
                    .iter()
                    .map(operation_to_list_item)
                    .collect::<Vec<OperationListItem>>();
                println!("{}", serde_json::to_string_pretty(&json_items)?);
            } else if operations.is_empty() {
                println!("Sync queue is empty.");
            } else {
                for line in format_operation_lines(&operations) {
                    println!("{line}");
                }
            }
        }
        QueueCommands::Retry { id } => {
            let retried = store.retry_failed(id).await?;
            println!("{retried} operations queued for retry");
        }
        QueueCommands::Discard { id } => {
            let discarded = store.discard_operation(id).await?;
            println!(
                "Discarded {} operation {} for catch {}",
                discarded.kind, discarded.id, discarded.record_id
            );
        }
    }

    Ok(())
}
