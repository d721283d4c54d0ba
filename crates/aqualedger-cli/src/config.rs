//! Persistent CLI configuration and environment overrides.

use std::fmt;
use std::path::{Path, PathBuf};

use aqualedger_core::config::LedgerConfig;

const CONFIG_FILE_NAME: &str = "config.json";
const DB_FILE_NAME: &str = "aqualedger.db";

pub const REMOTE_URL_ENV: &str = "AQUALEDGER_REMOTE_URL";
pub const SCORING_URL_ENV: &str = "AQUALEDGER_SCORING_URL";
pub const API_TOKEN_ENV: &str = "AQUALEDGER_API_TOKEN";
pub const DB_PATH_ENV: &str = "AQUALEDGER_DB_PATH";

/// Everything a command needs to reach local and remote storage
#[derive(Clone, PartialEq, Eq)]
pub struct CliSettings {
    pub ledger: LedgerConfig,
    /// Bearer token for the ledger and scoring service, from the environment only
    pub api_token: Option<String>,
    pub db_path: PathBuf,
}

impl fmt::Debug for CliSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliSettings")
            .field("ledger", &self.ledger)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl CliSettings {
    /// Load the config file and apply environment overrides.
    pub fn resolve(
        config_path: Option<&Path>,
        cli_db_path: Option<PathBuf>,
    ) -> Result<Self, String> {
        let path = config_path.map_or_else(default_config_path, Path::to_path_buf);
        let ledger = load_config_from_path(&path)?;
        Self::from_parts(ledger, cli_db_path, |name| std::env::var(name).ok())
    }

    /// Combine file values with overrides read through `lookup`.
    ///
    /// A `--db-path` flag beats `AQUALEDGER_DB_PATH`, which beats the default.
    pub fn from_parts(
        mut ledger: LedgerConfig,
        cli_db_path: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        if let Some(url) = lookup(REMOTE_URL_ENV) {
            ledger.remote_endpoint = Some(url);
        }
        if let Some(url) = lookup(SCORING_URL_ENV) {
            ledger.scoring_endpoint = Some(url);
        }
        let ledger = ledger
            .normalized()
            .map_err(|error| format!("{error} (after environment overrides)"))?;

        let api_token = aqualedger_core::util::normalize_text_option(lookup(API_TOKEN_ENV));
        let db_path = cli_db_path
            .or_else(|| {
                aqualedger_core::util::normalize_text_option(lookup(DB_PATH_ENV))
                    .map(PathBuf::from)
            })
            .unwrap_or_else(default_db_path);

        Ok(Self {
            ledger,
            api_token,
            db_path,
        })
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aqualedger")
        .join(CONFIG_FILE_NAME)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aqualedger")
        .join(DB_FILE_NAME)
}

/// Read the config file, returning defaults when it does not exist.
pub fn load_config_from_path(path: &Path) -> Result<LedgerConfig, String> {
    if !path.exists() {
        return Ok(LedgerConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
    LedgerConfig::from_json(&raw)
        .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))
}

pub fn save_config_to_path(config: &LedgerConfig, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create config directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }

    let normalized = config.clone().normalized()?;
    let serialized = serde_json::to_string_pretty(&normalized)
        .map_err(|error| format!("Failed to serialize config: {error}"))?;
    std::fs::write(path, serialized)
        .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
}
