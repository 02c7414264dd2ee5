// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized `std::env::var` reads for the engine crate, following the
//! teacher workspace's per-crate `env.rs` convention.

use std::time::Duration;

const DEFAULT_SUPPRESSION_REFRESH_SECS: u64 = 30;
const DEFAULT_CONNECTION_REFUSED_BACKOFF_SECS: u64 = 300;

fn parse_env_secs(var: &str, default: u64) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

/// How often the suppression store re-checks the regex file's mtime.
pub fn suppression_refresh_interval() -> Duration {
    parse_env_secs(
        "LT_SUPPRESSION_REFRESH_SECS",
        DEFAULT_SUPPRESSION_REFRESH_SECS,
    )
}

/// How long the batching handler backs off after a connection-refused error
/// before retrying delivery. Per SPEC_FULL §9.1, an explicit value of zero is
/// not accepted and the default is used instead.
pub fn connection_refused_backoff() -> Duration {
    parse_env_secs(
        "LT_CONNECTION_REFUSED_BACKOFF_SECS",
        DEFAULT_CONNECTION_REFUSED_BACKOFF_SECS,
    )
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
