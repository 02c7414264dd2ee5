// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log tail daemon (ltd)
//!
//! Background process that discovers configured log files, supervises one
//! tail executor per `(service, path)` pair, and drains their performance
//! samples into the configured sink.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fs2::FileExt;
use lt_adapters::{DesktopNotifyAdapter, HttpSinkAdapter, NotifyAdapter, SinkAdapter, TracedNotify, TracedSink};
use lt_core::BatchRecord;
use lt_engine::{BatchQueue, BatchingHandler, EventHandler, PerformanceSampleHandler, SuppressionStore};
use lt_daemon::config::{Config, ConfigError};
use lt_daemon::hooks::ProductionHooks;
use lt_daemon::watcher::Watcher;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("ltd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("ltd {}", env!("CARGO_PKG_VERSION"));
                println!("Log tail daemon - tails configured log files and forwards samples to a sink");
                println!();
                println!("USAGE:");
                println!("    ltd");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: ltd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;

    rotate_log_if_needed(&config.log_path);
    write_startup_marker(&config)?;

    let _lock_file = match acquire_singleton_lock(&config) {
        Ok(f) => f,
        Err(()) => {
            eprintln!("ltd is already running");
            std::process::exit(1);
        }
    };

    let log_guard = match setup_logging(&config) {
        Ok(g) => g,
        Err(e) => {
            write_startup_error(&config, &e);
            return Err(e.into());
        }
    };

    info!("starting log tail daemon");

    let started_at = Utc::now();

    let notify: Arc<dyn NotifyAdapter> = Arc::new(TracedNotify::new(DesktopNotifyAdapter::new()));
    let hooks = Arc::new(ProductionHooks::new(notify));

    let suppression = SuppressionStore::new(config.regex_path.clone(), config.regex_lock_path.clone());
    let _refresh_handle = suppression.spawn_background_refresh(
        config.suppression_refresh_interval.unwrap_or(Duration::from_secs(30)),
        Arc::clone(&hooks) as Arc<dyn lt_engine::TailHooks>,
    );

    let sink: Arc<dyn SinkAdapter> = Arc::new(TracedSink::new(HttpSinkAdapter::new(config.sink_endpoint.clone())));
    let queue = BatchQueue::new();

    let mut handlers: HashMap<String, Arc<dyn EventHandler>> = HashMap::new();
    handlers.insert(
        config.performance_callable_name.clone(),
        Arc::new(PerformanceSampleHandler::new(Arc::clone(&queue), config.performance_callable_name.clone())),
    );

    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<Vec<BatchRecord>>();
    let batching = Arc::new(BatchingHandler::new(
        Arc::clone(&queue),
        sink,
        config.count_trigger,
        config.time_trigger,
        config.connection_refused_backoff.unwrap_or(Duration::from_secs(300)),
        error_tx,
    ));
    let batching_task = {
        let batching = Arc::clone(&batching);
        tokio::spawn(async move { batching.run().await })
    };
    let error_drain_task = tokio::spawn(async move {
        while let Some(records) = error_rx.recv().await {
            warn!(count = records.len(), "records dropped after sink delivery failure");
        }
    });

    let watcher = Arc::new(Watcher::new(
        Arc::clone(&hooks) as Arc<dyn lt_engine::TailHooks>,
        handlers,
        suppression,
        started_at,
    ));
    let (_clear_tx, clear_rx) = mpsc::unbounded_channel();
    let watcher_task = {
        let watcher = Arc::clone(&watcher);
        let descriptors = config.log_details.clone();
        let poll_interval = Duration::from_millis(lt_daemon::env::watcher_poll_ms().unwrap_or(500));
        tokio::spawn(async move { watcher.run(descriptors, poll_interval, clear_rx).await })
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("daemon ready");
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    watcher.shutdown().await;
    watcher_task.abort();
    batching_task.abort();
    error_drain_task.abort();

    info!("daemon stopped");
    drop(log_guard);
    Ok(())
}

/// Single-daemon enforcement: an exclusive lock on `<state_dir>/daemon.lock`.
/// No pid/version breadcrumb is written back to the lock file since nothing
/// reads it back.
fn acquire_singleton_lock(config: &Config) -> Result<std::fs::File, ()> {
    let lock_path = config.state_dir.join("daemon.lock");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(&lock_path)
        .map_err(|_| ())?;
    file.try_lock_exclusive().map_err(|_| ())?;
    Ok(file)
}

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`]. Best-effort:
/// rotation failures are silently ignored so the daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

const STARTUP_MARKER_PREFIX: &str = "--- ltd: starting (pid: ";

fn write_startup_marker(config: &Config) -> Result<(), ConfigError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&config.log_path)?;
    writeln!(file, "{}{}) ---\n", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

fn write_startup_error(config: &Config, error: &ConfigError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(&config.log_path) else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start daemon: {error}");
}

fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, ConfigError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let parent = config.log_path.parent().ok_or(ConfigError::NoStateDir)?;
    let file_name = config.log_path.file_name().ok_or(ConfigError::NoStateDir)?;
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
