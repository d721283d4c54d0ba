use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "aqualedger")]
#[command(about = "Log catches offline and sync them to the ledger later")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Quick log: aqualedger "20 kg of tuna"
    #[arg(trailing_var_arg = true)]
    pub catch: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log a catch from a sentence ("20.5 kilos of salmon")
    Log {
        /// Spoken or typed description; read from stdin when omitted
        text: Vec<String>,
    },
    /// Log a catch from explicit fields
    #[command(alias = "new")]
    Add {
        /// Species name
        #[arg(short, long)]
        species: String,
        /// Weight in kilograms
        #[arg(short, long)]
        weight: Option<f64>,
    },
    /// Show how a sentence would be parsed without saving it
    Parse {
        text: Vec<String>,
    },
    /// Start a voice session; each line on stdin is a final transcript
    Listen,
    /// List logged catches, newest first
    List {
        /// Only show catches with this sync status
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
        /// Only show species containing this text
        #[arg(long)]
        species: Option<String>,
        /// Number of catches to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single catch
    Show {
        /// Catch ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change species or weight of a catch
    Edit {
        /// Catch ID or unique ID prefix
        id: String,
        #[arg(short, long)]
        species: Option<String>,
        /// Weight in kilograms
        #[arg(short, long)]
        weight: Option<f64>,
        /// Remove the attached photo
        #[arg(long)]
        clear_photo: bool,
    },
    /// Delete a catch
    Delete {
        /// Catch ID or unique ID prefix
        id: String,
    },
    /// Show the aggregate sync state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Push queued changes to the remote ledger
    Sync {
        /// Keep running and sync whenever work is ready (Ctrl-C stops)
        #[arg(long)]
        watch: bool,
        /// Treat the device as offline
        #[arg(long)]
        offline: bool,
    },
    /// Inspect and manage the sync queue
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
    /// Re-score a catch with the sustainability service
    Score {
        /// Catch ID or unique ID prefix
        id: String,
        /// Where the fish was caught
        #[arg(long)]
        location: Option<String>,
        /// Fishing method
        #[arg(long)]
        method: Option<String>,
    },
    /// Ask the sustainability service for advice on a species
    Tips {
        #[arg(short, long)]
        species: String,
        /// Weight in kilograms
        #[arg(short, long)]
        weight: Option<f64>,
        #[arg(long)]
        location: Option<String>,
        /// Catch date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        method: Option<String>,
    },
    /// Export catches
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure ledger endpoints and sync tuning
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusFilter {
    Pending,
    Synced,
    Error,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// List queued operations, oldest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move failed operations back to pending
    Retry {
        /// Operation ID; all failed operations when omitted
        id: Option<i64>,
    },
    /// Drop a failed operation without sending it
    Discard {
        /// Operation ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create or update the configuration file
    Init {
        /// Remote ledger base URL
        #[arg(long, value_name = "URL")]
        remote_endpoint: Option<String>,
        /// Sustainability scoring service base URL
        #[arg(long, value_name = "URL")]
        scoring_endpoint: Option<String>,
        /// Wait after the first failed sync attempt
        #[arg(long, value_name = "SECS")]
        initial_backoff_secs: Option<u64>,
        /// Longest wait between sync attempts
        #[arg(long, value_name = "SECS")]
        max_backoff_secs: Option<u64>,
        /// How often `sync --watch` checks for work
        #[arg(long, value_name = "SECS")]
        poll_interval_secs: Option<u64>,
    },
    /// Print the effective configuration
    Show,
}
