//! AquaLedger CLI - log catches from the terminal, offline first
//!
//! Catches are stored locally right away and pushed to the remote ledger
//! whenever `aqualedger sync` runs with a reachable endpoint.

mod cli;
mod commands;
mod config;
mod error;
#[cfg(test)]
mod tests;

use aqualedger_core::scoring::ScoringRequest;
use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::list::{run_list, run_show};
use crate::commands::listen::run_listen;
use crate::commands::log::{run_add, run_log, run_parse};
use crate::commands::queue::run_queue;
use crate::commands::score::{run_score, run_tips};
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::config::CliSettings;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "aqualedger=info,aqualedger_core=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // These work without a readable configuration
    match cli.command {
        Some(Commands::Config { command }) => {
            return run_config(command, cli.config.as_deref(), cli.db_path);
        }
        Some(Commands::Completions { shell, output }) => {
            return run_completions(shell, output.as_deref());
        }
        Some(Commands::Parse { text }) => return run_parse(&text),
        _ => {}
    }

    let settings =
        CliSettings::resolve(cli.config.as_deref(), cli.db_path).map_err(CliError::Config)?;
    tracing::debug!("Using {settings:?}");

    match cli.command {
        Some(Commands::Log { text }) => run_log(&text, &settings).await?,
        Some(Commands::Add { species, weight }) => run_add(&species, weight, &settings).await?,
        Some(Commands::Listen) => run_listen(&settings).await?,
        Some(Commands::List {
            status,
            species,
            limit,
            json,
        }) => run_list(status, species, limit, json, &settings).await?,
        Some(Commands::Show { id, json }) => run_show(&id, json, &settings).await?,
        Some(Commands::Edit {
            id,
            species,
            weight,
            clear_photo,
        }) => run_edit(&id, species, weight, clear_photo, &settings).await?,
        Some(Commands::Delete { id }) => run_delete(&id, &settings).await?,
        Some(Commands::Status { json }) => run_status(json, &settings).await?,
        Some(Commands::Sync { watch, offline }) => run_sync(watch, offline, &settings).await?,
        Some(Commands::Queue { command }) => run_queue(command, &settings).await?,
        Some(Commands::Score {
            id,
            location,
            method,
        }) => run_score(&id, location, method, &settings).await?,
        Some(Commands::Tips {
            species,
            weight,
            location,
            date,
            method,
        }) => {
            let request = ScoringRequest {
                species,
                weight_kg: weight,
                location,
                date,
                method,
            };
            run_tips(request, &settings).await?;
        }
        Some(Commands::Export { format, output }) => {
            run_export(format, output.as_deref(), &settings).await?;
        }
        Some(Commands::Config { .. } | Commands::Completions { .. } | Commands::Parse { .. }) => {}
        None => {
            // Quick log mode: aqualedger "20 kg of tuna"
            if cli.catch.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                run_log(&cli.catch, &settings).await?;
            }
        }
    }

    Ok(())
}
