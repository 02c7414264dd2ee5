// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File watcher / supervisor (C7) and its cache-clear channel (C8),
//! SPEC_FULL §4.7.
//!
//! Grounded on
//! `examples/original_source/FluxPythonUtils/log_analyzer/tail_executor.py`'s
//! polling loop: literal paths are checked for existence, glob paths are
//! expanded every pass, and a `(service, path)` pair already in the cache is
//! never spawned twice. Per SPEC_FULL §9.1's resolved process-isolation
//! question, "spawning an executor" means `tokio::spawn`ing a
//! [`lt_engine::TailExecutor::run`] task rather than forking an OS process,
//! so the cache holds the `Arc<TailExecutor>` (for `request_shutdown`) and
//! its `JoinHandle` (standing in for the original's process handle) side by
//! side.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lt_core::LogDetail;
use lt_engine::{CheckpointCell, EventHandler, SuppressionStore, TailExecutor, TailExecutorConfig, TailHooks};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// A `(service, path)` pair, the dedup key spec.md §4.7 requires: two
/// services tailing the same literal path each get their own executor.
type CacheKey = (String, String);

struct CachedExecutor {
    executor: Arc<TailExecutor>,
    handle: JoinHandle<()>,
}

/// Supervises the set of running tail executors: spawns one per newly
/// discovered `(service, path)` pair and tears one down (for a later
/// respawn) when told to via [`Watcher::clear`].
pub struct Watcher {
    hooks: Arc<dyn TailHooks>,
    handlers: Arc<HashMap<String, Arc<dyn EventHandler>>>,
    suppression: Arc<SuppressionStore>,
    started_at: DateTime<Utc>,
    cache: Mutex<HashMap<CacheKey, CachedExecutor>>,
}

impl Watcher {
    pub fn new(
        hooks: Arc<dyn TailHooks>,
        handlers: HashMap<String, Arc<dyn EventHandler>>,
        suppression: Arc<SuppressionStore>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            hooks,
            handlers: Arc::new(handlers),
            suppression,
            started_at,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Run the ~2Hz discovery loop until `clear_rx`'s sender is dropped.
    /// `descriptors` is the static configured list; each pass re-evaluates
    /// every entry, expanding glob paths fresh every time.
    pub async fn run(
        &self,
        descriptors: Vec<LogDetail>,
        poll_interval: Duration,
        mut clear_rx: mpsc::UnboundedReceiver<CacheKey>,
    ) {
        if descriptors.is_empty() {
            self.hooks
                .notify_error("no log descriptors configured", "watcher.rs", line!(), Utc::now())
                .await;
        }

        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for detail in &descriptors {
                        self.poll_one(detail).await;
                    }
                }
                Some(key) = clear_rx.recv() => {
                    self.clear(&key.0, &key.1).await;
                }
                else => return,
            }
        }
    }

    async fn poll_one(&self, detail: &LogDetail) {
        if !detail.log_file_path_is_regex {
            if std::path::Path::new(&detail.log_file_path).exists() {
                self.maybe_spawn(detail.clone()).await;
            }
            return;
        }

        match glob::glob(&detail.log_file_path) {
            Ok(paths) => {
                for entry in paths {
                    match entry {
                        Ok(path) => {
                            let expanded = detail.with_expanded_path(path.to_string_lossy().into_owned());
                            self.maybe_spawn(expanded).await;
                        }
                        Err(e) => warn!(error = %e, pattern = %detail.log_file_path, "glob entry unreadable"),
                    }
                }
            }
            Err(e) => {
                error!(error = %e, pattern = %detail.log_file_path, "invalid glob pattern");
            }
        }
    }

    async fn maybe_spawn(&self, detail: LogDetail) {
        let key = (detail.service.clone(), detail.log_file_path.clone());
        if self.cache.lock().contains_key(&key) {
            return;
        }

        let name = checkpoint_name(&detail.service, &detail.log_file_path);
        let checkpoint = match CheckpointCell::open_or_create(name.clone()) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                self.hooks.notify_error(&e.to_string(), "watcher.rs", line!(), Utc::now()).await;
                return;
            }
        };

        let mut detail = detail;
        // A cold-started cell has no prior literal-format value to resume
        // from, so it is seeded with the watcher's own start time, rendered
        // in RFC-3339 — a synthetic checkpoint, not a value read from the
        // log.
        let resume = match checkpoint.get() {
            Ok(Some(ts)) => ts,
            Ok(None) => self.started_at.to_rfc3339(),
            Err(e) => {
                self.hooks.notify_error(&e.to_string(), "watcher.rs", line!(), Utc::now()).await;
                return;
            }
        };
        detail.processed_timestamp = Some(resume.clone());
        if let Err(e) = checkpoint.set(&resume) {
            self.hooks.notify_error(&e.to_string(), "watcher.rs", line!(), Utc::now()).await;
            return;
        }

        let service = detail.service.clone();
        let path = detail.log_file_path.clone();
        let config = TailExecutorConfig { log_detail: detail };
        let executor = Arc::new(TailExecutor::new(
            config,
            checkpoint,
            Arc::clone(&self.suppression),
            Arc::clone(&self.hooks),
            (*self.handlers).clone(),
        ));

        let task_executor = Arc::clone(&executor);
        let handle = tokio::spawn(async move { task_executor.run().await });

        info!(service = %service, path = %path, name = %name, "tail executor spawned");
        self.cache.lock().insert(key, CachedExecutor { executor, handle });
    }

    /// Evict `(service, path)` from the cache so the next discovery pass
    /// spawns it fresh. Unknown pairs are logged and otherwise ignored.
    pub async fn clear(&self, service: &str, path: &str) {
        let key = (service.to_string(), path.to_string());
        let removed = self.cache.lock().remove(&key);
        match removed {
            Some(cached) => {
                cached.executor.request_shutdown();
                info!(service, path, "cache entry cleared, executor signaled");
            }
            None => warn!(service, path, "cache-clear requested for unknown entry"),
        }
    }

    /// Signal every cached executor to shut down, then wait for all of them
    /// to finish. No timeout, per spec.md §5's graceful-shutdown contract.
    pub async fn shutdown(&self) {
        let cached: Vec<CachedExecutor> = self.cache.lock().drain().map(|(_, v)| v).collect();
        for c in &cached {
            c.executor.request_shutdown();
        }
        for c in cached {
            let _ = c.handle.await;
        }
    }
}

fn checkpoint_name(service: &str, path: &str) -> String {
    let basename = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    format!("tail_executor~{service}~{basename}")
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
