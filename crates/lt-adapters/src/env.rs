// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// HTTP sink request timeout (default: 30s).
pub fn sink_request_timeout_ms() -> Duration {
    parse_duration_ms("LT_SINK_TIMEOUT_MS").unwrap_or(Duration::from_secs(30))
}
