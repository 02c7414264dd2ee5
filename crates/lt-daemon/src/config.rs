// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration (SPEC_FULL §3.1 / spec.md §6 "Configuration
//! (input)"): a TOML file deserialized into a [`ConfigToml`], then resolved
//! into the runtime [`Config`] the watcher and executors consume.
//!
//! Path resolution follows a state-dir-relative layout; field names and
//! defaults follow spec.md §6's configuration table.

use std::path::PathBuf;
use std::time::Duration;

use lt_core::log_detail::LogDetailConfig;
use lt_core::{LogDetail, LogDetailError};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory (set LT_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no log descriptors configured")]
    NoLogDetails,

    #[error("log descriptor {service:?} is invalid: {source}")]
    InvalidLogDetail {
        service: String,
        #[source]
        source: LogDetailError,
    },

    #[error("client_connection_fail_retry_secs must not be zero")]
    ZeroConnectionRetry,

    #[error("sink_endpoint must not be empty")]
    EmptySinkEndpoint,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// On-disk shape of the configuration file, per spec.md §6's field list.
#[derive(Debug, Clone, Deserialize)]
struct ConfigToml {
    regex_file_name: String,
    regex_lock_file_name: String,
    #[serde(default)]
    regex_file_dir_path: Option<String>,
    #[serde(default)]
    regex_list_refresh_time_wait: Option<u64>,
    transaction_counts_per_call_for_server: usize,
    transaction_counts_per_call_for_tail_ex: usize,
    transaction_timeout_secs: u64,
    #[serde(default)]
    client_connection_fail_retry_secs: Option<u64>,
    sink_endpoint: String,
    #[serde(default = "default_performance_callable_name")]
    performance_callable_name: String,
    #[serde(default)]
    log_dir: Option<String>,
    #[serde(rename = "log_detail", default)]
    log_details: Vec<LogDetailConfig>,
}

fn default_performance_callable_name() -> String {
    "report_performance".to_string()
}

/// Resolved runtime configuration for the daemon binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub log_path: PathBuf,
    pub regex_path: PathBuf,
    pub regex_lock_path: PathBuf,
    pub suppression_refresh_interval: Option<Duration>,
    /// spec.md §6's `transaction_counts_per_call_for_server`: carried through
    /// for host-side reference (the HTTP sink's own batching policy, which is
    /// out of this system's scope per spec.md §1).
    pub transaction_counts_per_call_for_server: usize,
    /// The batching queue handler's count trigger (C3).
    pub count_trigger: usize,
    /// The batching queue handler's time trigger (C3).
    pub time_trigger: Duration,
    pub connection_refused_backoff: Option<Duration>,
    pub sink_endpoint: String,
    pub performance_callable_name: String,
    pub log_details: Vec<LogDetail>,
}

impl Config {
    /// Load configuration from `LT_CONFIG_PATH` (or `<state_dir>/config.toml`).
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = crate::env::state_dir().ok_or(ConfigError::NoStateDir)?;
        let config_path = crate::env::config_path().ok_or(ConfigError::NoStateDir)?;

        let raw = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let parsed: ConfigToml = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?;

        Self::from_toml(parsed, state_dir)
    }

    fn from_toml(parsed: ConfigToml, state_dir: PathBuf) -> Result<Self, ConfigError> {
        if parsed.log_details.is_empty() {
            return Err(ConfigError::NoLogDetails);
        }
        if parsed.sink_endpoint.trim().is_empty() {
            return Err(ConfigError::EmptySinkEndpoint);
        }
        if parsed.client_connection_fail_retry_secs == Some(0) {
            return Err(ConfigError::ZeroConnectionRetry);
        }

        let regex_dir = parsed
            .regex_file_dir_path
            .map(PathBuf::from)
            .unwrap_or_else(|| state_dir.clone());
        let log_dir = parsed.log_dir.map(PathBuf::from).unwrap_or_else(|| state_dir.clone());

        let mut log_details = Vec::with_capacity(parsed.log_details.len());
        for descriptor in parsed.log_details {
            let service = descriptor.service.clone();
            log_details
                .push(descriptor.into_log_detail().map_err(|source| ConfigError::InvalidLogDetail {
                    service,
                    source,
                })?);
        }

        Ok(Self {
            log_path: log_dir.join("daemon.log"),
            regex_path: regex_dir.join(&parsed.regex_file_name),
            regex_lock_path: regex_dir.join(&parsed.regex_lock_file_name),
            suppression_refresh_interval: parsed.regex_list_refresh_time_wait.map(Duration::from_secs),
            transaction_counts_per_call_for_server: parsed.transaction_counts_per_call_for_server,
            count_trigger: parsed.transaction_counts_per_call_for_tail_ex,
            time_trigger: Duration::from_secs(parsed.transaction_timeout_secs),
            connection_refused_backoff: parsed.client_connection_fail_retry_secs.map(Duration::from_secs),
            sink_endpoint: parsed.sink_endpoint,
            performance_callable_name: parsed.performance_callable_name,
            log_details,
            state_dir,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
