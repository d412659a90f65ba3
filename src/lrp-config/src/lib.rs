//! [`BridgeConfig`]: the single JSON document loaded by `--config-path`
//! (or `LRP_BRIDGE_CONFIG_PATH`) and split by the supervisor into a
//! listener-facing and a watcher-facing view.
//!
//! Grounded in `config/config.go`'s `NewListenerConfig`/`NewWatcherConfig`
//! split, but unified here into one struct with per-subsystem default
//! helpers, since this workspace runs both subsystems from one process.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_listen_address() -> String {
    "0.0.0.0:1518".to_string()
}

fn default_max_in_flight_requests() -> usize {
    200
}

fn default_bulk_lrp_status_workers() -> usize {
    15
}

fn default_max_event_handling_workers() -> usize {
    500
}

fn default_watcher_max_consecutive_next_errors() -> u32 {
    3
}

fn default_default_container_port() -> u16 {
    8080
}

fn default_readiness_changed_path() -> String {
    "/internal/v4/apps/{guid}/readiness_changed".to_string()
}

fn default_lock_retry_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_lock_ttl() -> Duration {
    Duration::from_secs(10)
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

pub use lrp_ore::tracing::LogLevel;

/// The bridge's single configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    // --- BBS ---
    pub bbs_api_url: String,
    pub bbs_ca_cert: String,
    pub bbs_client_cert: String,
    pub bbs_client_key: String,
    #[serde(default)]
    pub bbs_max_idle_conns_per_host: Option<usize>,

    // --- CC ---
    pub cc_base_url: String,
    pub cc_client_cert: String,
    pub cc_client_key: String,
    pub cc_ca_cert: String,
    #[serde(default = "default_readiness_changed_path")]
    pub readiness_changed_path: String,

    // --- Listener ---
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    pub traffic_controller_url: String,
    #[serde(default)]
    pub skip_cert_verify: bool,
    #[serde(default = "default_max_in_flight_requests")]
    pub max_in_flight_requests: usize,
    #[serde(default = "default_bulk_lrp_status_workers")]
    pub bulk_lrp_status_workers: usize,
    #[serde(default = "default_default_container_port")]
    pub default_container_port: u16,

    // --- Watcher ---
    #[serde(default = "default_max_event_handling_workers")]
    pub max_event_handling_workers: usize,
    #[serde(default = "default_watcher_max_consecutive_next_errors")]
    pub watcher_max_consecutive_next_errors: u32,

    // --- Leader lock ---
    #[serde(default = "default_lock_retry_interval", with = "humantime_serde")]
    pub lock_retry_interval: Duration,
    #[serde(default = "default_lock_ttl", with = "humantime_serde")]
    pub lock_ttl: Duration,
    pub locket_address: String,
    #[serde(default)]
    pub locket_ca_cert: Option<String>,
    #[serde(default)]
    pub locket_client_cert: Option<String>,
    #[serde(default)]
    pub locket_client_key: Option<String>,

    // --- Ambient ---
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
    pub telemetry_port: u16,
}

/// Failure modes loading and validating a [`BridgeConfig`]. Every variant
/// maps to process exit code 2 per the specification's "invalid
/// configuration or missing required field" contract.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path} as JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing required configuration field: {0}")]
    MissingField(&'static str),
}

impl BridgeConfig {
    /// Loads and validates a [`BridgeConfig`] from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<BridgeConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: BridgeConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the fields the specification calls out as required (e.g. the
    /// leader-election service address) rather than relying solely on serde
    /// to reject a missing field, since several fields are legitimately
    /// optional strings that are merely required to be *non-empty*.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.locket_address.trim().is_empty() {
            return Err(ConfigError::MissingField("locket_address"));
        }
        if self.bbs_api_url.trim().is_empty() {
            return Err(ConfigError::MissingField("bbs_api_url"));
        }
        if self.cc_base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("cc_base_url"));
        }
        Ok(())
    }
}
