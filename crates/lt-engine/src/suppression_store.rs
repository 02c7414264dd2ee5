// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background refresher for the suppression-regex file (spec.md §4.2).
//!
//! Grounded on
//! `examples/original_source/FluxPythonUtils/log_analyzer/tail_executor.py`'s
//! `refresh_regex_list`: stat the file, compare mtime against the last seen
//! snapshot, and reload under an advisory lock only when it changed. A
//! missing file reloads to an empty list exactly once, not on every poll.

use crate::hooks::TailHooks;
use chrono::Utc;
use fs2::FileExt;
use lt_core::SuppressionList;
use parking_lot::RwLock;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::time::Duration;
use tracing::{info, warn};

/// Owns the live [`SuppressionList`] snapshot and knows how to refresh it
/// from `regex_path`, guarded by `lock_path` (an advisory lock file, so a
/// concurrent writer and this reader never observe a half-written file).
pub struct SuppressionStore {
    regex_path: PathBuf,
    lock_path: PathBuf,
    current: RwLock<SuppressionList>,
    last_modified: RwLock<Option<SystemTime>>,
}

impl SuppressionStore {
    pub fn new(regex_path: impl Into<PathBuf>, lock_path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            regex_path: regex_path.into(),
            lock_path: lock_path.into(),
            current: RwLock::new(SuppressionList::empty()),
            last_modified: RwLock::new(None),
        })
    }

    /// The current snapshot. Cheap to call often — callers on the hot path
    /// (line classification) should hold the clone, not the store.
    pub fn current(&self) -> SuppressionList {
        self.current.read().clone()
    }

    /// Reload if the backing file's mtime moved since the last load, or if
    /// the file was deleted since the last successful load. Returns `true`
    /// if the snapshot changed. A pattern that fails to compile is reported
    /// through `hooks.notify_error` as well as logged (spec.md §7).
    pub async fn refresh_if_stale(&self, hooks: &Arc<dyn TailHooks>) -> bool {
        match std::fs::metadata(&self.regex_path) {
            Ok(meta) => {
                let modified = meta.modified().ok();
                let stale = *self.last_modified.read() != modified;
                if !stale {
                    return false;
                }
                match self.load_locked() {
                    Ok(list) => {
                        let broken = list.broken_patterns().to_vec();
                        *self.current.write() = list;
                        *self.last_modified.write() = modified;
                        if !broken.is_empty() {
                            warn!(?broken, "suppression file has uncompilable patterns");
                            for pattern in &broken {
                                hooks
                                    .notify_error(
                                        &format!("suppression pattern {pattern:?} failed to compile"),
                                        "suppression_store.rs",
                                        line!(),
                                        Utc::now(),
                                    )
                                    .await;
                            }
                        }
                        info!(path = %self.regex_path.display(), "suppression list reloaded");
                        true
                    }
                    Err(e) => {
                        warn!(error = %e, path = %self.regex_path.display(), "failed to reload suppression file");
                        false
                    }
                }
            }
            Err(_) => {
                let had_any = !self.current.read().is_empty() || self.last_modified.read().is_some();
                if had_any {
                    *self.current.write() = SuppressionList::empty();
                    *self.last_modified.write() = None;
                    warn!(path = %self.regex_path.display(), "suppression file disappeared, list cleared");
                    true
                } else {
                    false
                }
            }
        }
    }

    fn load_locked(&self) -> std::io::Result<SuppressionList> {
        let lock_file = open_or_create_lock_file(&self.lock_path)?;
        lock_file.lock_exclusive()?;
        let mut contents = String::new();
        let result = File::open(&self.regex_path).and_then(|mut f| f.read_to_string(&mut contents));
        lock_file.unlock()?;
        result?;
        Ok(SuppressionList::from_lines(contents.lines()))
    }

    /// Spawn a task that calls [`Self::refresh_if_stale`] on `interval`
    /// until the returned handle is dropped or aborted.
    pub fn spawn_background_refresh(
        self: &Arc<Self>,
        interval: Duration,
        hooks: Arc<dyn TailHooks>,
    ) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                store.refresh_if_stale(&hooks).await;
            }
        })
    }
}

fn open_or_create_lock_file(path: &Path) -> std::io::Result<File> {
    std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
}

#[cfg(test)]
#[path = "suppression_store_tests.rs"]
mod tests;
