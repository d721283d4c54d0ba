use std::path::{Path, PathBuf};

use aqualedger_core::config::LedgerConfig;

use crate::cli::ConfigCommands;
use crate::config::{
    default_config_path, load_config_from_path, save_config_to_path, CliSettings, API_TOKEN_ENV,
};
use crate::error::CliError;

/// Values passed to `config init`; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub remote_endpoint: Option<String>,
    pub scoring_endpoint: Option<String>,
    pub initial_backoff_secs: Option<u64>,
    pub max_backoff_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
}

pub fn run_config(
    command: ConfigCommands,
    config_path: Option<&Path>,
    cli_db_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let path = config_path.map_or_else(default_config_path, Path::to_path_buf);

    match command {
        ConfigCommands::Init {
            remote_endpoint,
            scoring_endpoint,
            initial_backoff_secs,
            max_backoff_secs,
            poll_interval_secs,
        } => {
            let update = ConfigUpdate {
                remote_endpoint,
                scoring_endpoint,
                initial_backoff_secs,
                max_backoff_secs,
                poll_interval_secs,
            };
            run_config_init(update, &path)
        }
        ConfigCommands::Show => {
            let settings =
                CliSettings::resolve(Some(&path), cli_db_path).map_err(CliError::Config)?;
            run_config_show(&settings, &path)
        }
    }
}

pub fn run_config_init(update: ConfigUpdate, path: &Path) -> Result<(), CliError> {
    let existing = load_config_from_path(path).map_err(CliError::Config)?;
    let config = apply_update(existing, update)?;
    save_config_to_path(&config, path).map_err(CliError::Config)?;
    println!("Saved config to {}", path.display());
    Ok(())
}

pub fn apply_update(
    mut config: LedgerConfig,
    update: ConfigUpdate,
) -> Result<LedgerConfig, CliError> {
    if let Some(endpoint) = update.remote_endpoint {
        config.remote_endpoint = Some(endpoint);
    }
    if let Some(endpoint) = update.scoring_endpoint {
        config.scoring_endpoint = Some(endpoint);
    }
    if let Some(secs) = update.initial_backoff_secs {
        config.sync.initial_backoff_secs = secs;
    }
    if let Some(secs) = update.max_backoff_secs {
        config.sync.max_backoff_secs = secs;
    }
    if let Some(secs) = update.poll_interval_secs {
        config.sync.poll_interval_secs = secs;
    }
    config.normalized().map_err(CliError::Config)
}

pub fn run_config_show(settings: &CliSettings, path: &Path) -> Result<(), CliError> {
    let output = serde_json::json!({
        "configPath": path.display().to_string(),
        "dbPath": settings.db_path.display().to_string(),
        "ledger": settings.ledger,
        "apiToken": settings.api_token.as_ref().map(|_| format!("<set via {API_TOKEN_ENV}>")),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
