use crate::commands::common::{open_store, resolve_catch};
use crate::config::CliSettings;
use crate::error::CliError;

pub async fn run_delete(id: &str, settings: &CliSettings) -> Result<(), CliError> {
    let store = open_store(settings).await?;
    let record = resolve_catch(&store, id).await?;

    store.delete(&record.id).await?;
    println!("{}", record.id);
    Ok(())
}
