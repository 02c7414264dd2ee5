// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Resolve state directory: `LT_STATE_DIR` > `XDG_STATE_HOME/lt` > `~/.local/state/lt`.
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("LT_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("lt"));
    }
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".local/state/lt"))
}

/// Path to the TOML config file: `LT_CONFIG_PATH` > `<state_dir>/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("LT_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }
    state_dir().map(|dir| dir.join("config.toml"))
}

/// Watcher poll interval override (spec.md §4.7's "~2 Hz").
pub fn watcher_poll_ms() -> Option<u64> {
    std::env::var("LT_WATCHER_POLL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
}
