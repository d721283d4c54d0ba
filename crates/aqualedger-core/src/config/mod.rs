//! Endpoint and sync tuning configuration shared by all clients.
//!
//! `LedgerConfig` is plain data: clients decide where it is stored and which
//! environment overrides apply. Secrets such as API tokens never live here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sync::BackoffPolicy;
use crate::util::{is_http_url, normalize_text_option};

const DEFAULT_INITIAL_BACKOFF_SECS: u64 = 5;
const DEFAULT_MAX_BACKOFF_SECS: u64 = 15 * 60;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Client configuration for the remote ledger and scoring service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Base URL of the remote catch ledger (`/v1/sync` is appended)
    #[serde(default)]
    pub remote_endpoint: Option<String>,
    /// Base URL of the AI sustainability scoring service
    #[serde(default)]
    pub scoring_endpoint: Option<String>,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Sync loop tuning, in whole seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SyncSettings {
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            initial_backoff_secs: DEFAULT_INITIAL_BACKOFF_SECS,
            max_backoff_secs: DEFAULT_MAX_BACKOFF_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl SyncSettings {
    #[must_use]
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            Duration::from_secs(self.initial_backoff_secs),
            Duration::from_secs(self.max_backoff_secs),
        )
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl LedgerConfig {
    /// Parse a configuration file body and validate it.
    pub fn from_json(payload: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|error| format!("invalid configuration JSON: {error}"))?;
        config.normalized()
    }

    /// Trim values, drop empty endpoints and check what remains.
    pub fn normalized(self) -> Result<Self, String> {
        let remote_endpoint =
            normalize_optional_http_url(self.remote_endpoint, "remote_endpoint")?;
        let scoring_endpoint =
            normalize_optional_http_url(self.scoring_endpoint, "scoring_endpoint")?;

        let sync = self.sync;
        if sync.initial_backoff_secs == 0 {
            return Err("sync.initial_backoff_secs must be at least 1".to_string());
        }
        if sync.max_backoff_secs < sync.initial_backoff_secs {
            return Err(
                "sync.max_backoff_secs must not be smaller than sync.initial_backoff_secs"
                    .to_string(),
            );
        }
        if sync.poll_interval_secs == 0 {
            return Err("sync.poll_interval_secs must be at least 1".to_string());
        }

        Ok(Self {
            remote_endpoint,
            scoring_endpoint,
            sync,
        })
    }

    /// True when catches can be pushed anywhere
    pub const fn has_remote(&self) -> bool {
        self.remote_endpoint.is_some()
    }
}

const fn default_initial_backoff_secs() -> u64 {
    DEFAULT_INITIAL_BACKOFF_SECS
}

const fn default_max_backoff_secs() -> u64 {
    DEFAULT_MAX_BACKOFF_SECS
}

const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn normalize_optional_http_url(raw: Option<String>, field: &str) -> Result<Option<String>, String> {
    let Some(value) = normalize_text_option(raw) else {
        return Ok(None);
    };
    if is_http_url(&value) {
        Ok(Some(value.trim_end_matches('/').to_string()))
    } else {
        Err(format!(
            "configuration field '{field}' must include http:// or https://"
        ))
    }
}
