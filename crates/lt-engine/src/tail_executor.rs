// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tail executor (C6): the lifecycle state machine that composes the
//! checkpoint cell, suppression store, tail reader, and line classifier for
//! one file.
//!
//! Per SPEC_FULL §9.1's resolved process-isolation question, one executor
//! runs as a `tokio::spawn`ed task rather than a forked OS process; the
//! reader and analyzer halves of its `Running` state are themselves two
//! tasks joined by an internal channel.

use crate::batching::BatchQueue;
use crate::checkpoint::CheckpointCell;
use crate::classifier::{classify_line, ClassifyOutcome};
use crate::hooks::{Severity, TailHooks};
use crate::suppression_store::SuppressionStore;
use crate::tail_reader::{TailLine, TailReader};
use async_trait::async_trait;
use chrono::Utc;
use lt_core::{BatchRecord, BatchRecordId, Event, ExecutorId, IdGen, LogDetail, UuidIdGen};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, warn};

/// Lifecycle states per spec.md §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Starting,
    Running,
    Restarting,
    Stopping,
    Terminated,
}

/// One configured prefix's handler. Dispatch resolves the callable name
/// carried on the matching [`lt_core::PrefixRule`] against this map, built
/// once at construction time — never by reflection (SPEC_FULL §4.6.1).
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: Event);
}

/// Parses the `callable_name;;;start_time;;;delta_ms` triple spec.md §4.6
/// describes as a first-class prefix, and enqueues a [`BatchRecord`] for the
/// performance sink — unless the callable is the one that the sink itself
/// feeds, which is dropped to avoid recursive sampling.
///
/// Generic over [`IdGen`] rather than holding `Arc<dyn IdGen>`: the trait's
/// `Clone` supertrait (needed so handlers can cheaply fan out a generator)
/// makes it non-object-safe.
pub struct PerformanceSampleHandler<G: IdGen = UuidIdGen> {
    queue: Arc<BatchQueue>,
    id_gen: G,
    performance_callable_name: String,
}

impl PerformanceSampleHandler<UuidIdGen> {
    pub fn new(queue: Arc<BatchQueue>, performance_callable_name: impl Into<String>) -> Self {
        Self {
            queue,
            id_gen: UuidIdGen,
            performance_callable_name: performance_callable_name.into(),
        }
    }
}

impl<G: IdGen> PerformanceSampleHandler<G> {
    pub fn with_id_gen<G2: IdGen>(self, id_gen: G2) -> PerformanceSampleHandler<G2> {
        PerformanceSampleHandler {
            queue: self.queue,
            id_gen,
            performance_callable_name: self.performance_callable_name,
        }
    }
}

#[async_trait]
impl<G: IdGen + 'static> EventHandler for PerformanceSampleHandler<G> {
    async fn handle(&self, event: Event) {
        let mut fields = event.log_message.splitn(3, lt_core::event::BRIEF_DETAIL_SEPARATOR);
        let (Some(callable_name), Some(start_time_raw), Some(delta_raw)) =
            (fields.next(), fields.next(), fields.next())
        else {
            warn!(message = %event.log_message, "performance sample triple malformed");
            return;
        };

        let Ok(start_time) = chrono::DateTime::parse_from_rfc3339(start_time_raw) else {
            warn!(raw = start_time_raw, "performance sample start_time unparseable");
            return;
        };
        let Ok(delta_ms) = delta_raw.trim().parse::<f64>() else {
            warn!(raw = delta_raw, "performance sample delta unparseable");
            return;
        };

        let record = BatchRecord::new(
            BatchRecordId::new(self.id_gen.next()),
            callable_name,
            start_time.with_timezone(&Utc),
            delta_ms,
        );
        if record.is_self_referential(&self.performance_callable_name) {
            return;
        }
        self.queue.push_back(record);
    }
}

/// Construction-time configuration for one executor.
pub struct TailExecutorConfig {
    pub log_detail: LogDetail,
}

impl TailExecutorConfig {
    pub fn new(log_detail: LogDetail) -> Self {
        Self { log_detail }
    }
}

/// One running (or about to run) tail executor.
pub struct TailExecutor {
    id: ExecutorId,
    log_detail: Mutex<LogDetail>,
    checkpoint: Arc<CheckpointCell>,
    suppression: Arc<SuppressionStore>,
    hooks: Arc<dyn TailHooks>,
    handlers: HashMap<String, Arc<dyn EventHandler>>,
    state: Mutex<ExecutorState>,
    terminate_triggered: AtomicBool,
}

impl TailExecutor {
    pub fn new(
        config: TailExecutorConfig,
        checkpoint: Arc<CheckpointCell>,
        suppression: Arc<SuppressionStore>,
        hooks: Arc<dyn TailHooks>,
        handlers: HashMap<String, Arc<dyn EventHandler>>,
    ) -> Self {
        let id = ExecutorId::new(checkpoint.name().to_string());
        Self {
            id,
            log_detail: Mutex::new(config.log_detail),
            checkpoint,
            suppression,
            hooks,
            handlers,
            state: Mutex::new(ExecutorState::Starting),
            terminate_triggered: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &ExecutorId {
        &self.id
    }

    pub async fn state(&self) -> ExecutorState {
        *self.state.lock().await
    }

    /// Idempotent per spec.md §4.8: sets the flag `run_loop` polls between
    /// select cycles, which unwinds to `Stopping` and kills the tail reader's
    /// process group once observed. Later calls are no-ops.
    pub fn request_shutdown(&self) {
        self.terminate_triggered.store(true, Ordering::SeqCst);
    }

    fn shutdown_requested(&self) -> bool {
        self.terminate_triggered.load(Ordering::SeqCst)
    }

    /// Run the executor to completion: `Starting` until `Terminated`, or
    /// until `request_shutdown` is observed. Re-enters `Starting` on a
    /// `Restarting` transition with the last known `processed_timestamp` as
    /// the new resume point.
    pub async fn run(&self) {
        loop {
            *self.state.lock().await = ExecutorState::Starting;
            let resume_ts = self.log_detail.lock().await.processed_timestamp.clone();

            let reader = {
                let detail = self.log_detail.lock().await;
                TailReader::spawn(&detail, resume_ts.as_deref())
            };

            let mut reader = match reader {
                Ok(r) => r,
                Err(e) => {
                    error!(error = %e, "tail reader spawn failed, terminating executor");
                    let detail = self.log_detail.lock().await;
                    self.hooks.notify_error(&e.to_string(), "tail_executor.rs", line!(), Utc::now()).await;
                    drop(detail);
                    *self.state.lock().await = ExecutorState::Terminated;
                    return;
                }
            };

            *self.state.lock().await = ExecutorState::Running;
            let outcome = self.run_loop(&mut reader).await;

            match outcome {
                LoopOutcome::Restart => {
                    let _ = reader.kill();
                    *self.state.lock().await = ExecutorState::Restarting;
                    let detail = self.log_detail.lock().await.clone();
                    self.hooks.handle_tail_restart(&detail).await;
                    continue;
                }
                LoopOutcome::Stop => {
                    *self.state.lock().await = ExecutorState::Stopping;
                    let _ = reader.kill();
                    *self.state.lock().await = ExecutorState::Terminated;
                    return;
                }
            }
        }
    }

    async fn run_loop(&self, reader: &mut TailReader) -> LoopOutcome {
        let (tx, mut rx) = mpsc::unbounded_channel::<TailLine>();
        let mut last_activity = tokio::time::Instant::now();

        loop {
            tokio::select! {
                biased;

                _ = tokio::time::sleep(Duration::from_millis(50)), if self.shutdown_requested() => {
                    return LoopOutcome::Stop;
                }

                line = reader.next_line() => {
                    match line {
                        Ok(Some(tail_line)) => {
                            if tx.send(tail_line).is_err() {
                                return LoopOutcome::Stop;
                            }
                        }
                        Ok(None) => {
                            warn!("tail subprocess stdout closed, restarting");
                            return LoopOutcome::Restart;
                        }
                        Err(e) => {
                            error!(error = %e, "error reading tail subprocess output");
                            return LoopOutcome::Restart;
                        }
                    }
                }

                received = tokio::time::timeout(self.poll_timeout().await, rx.recv()) => {
                    match received {
                        Ok(Some(tail_line)) => {
                            last_activity = tokio::time::Instant::now();
                            if let Some(outcome) = self.handle_tail_line(tail_line).await {
                                return outcome;
                            }
                        }
                        Ok(None) => return LoopOutcome::Stop,
                        Err(_timeout) => {
                            if last_activity.elapsed() >= self.poll_timeout().await {
                                let detail = self.log_detail.lock().await;
                                if detail.critical {
                                    self.hooks.notify_no_activity(&detail).await;
                                }
                                drop(detail);
                                last_activity = tokio::time::Instant::now();
                            }
                        }
                    }
                }
            }

            if self.shutdown_requested() {
                return LoopOutcome::Stop;
            }
        }
    }

    async fn poll_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.log_detail.lock().await.poll_timeout_seconds)
    }

    /// Returns `Some(outcome)` to unwind `run_loop`, or `None` to keep going.
    async fn handle_tail_line(&self, tail_line: TailLine) -> Option<LoopOutcome> {
        let line = match tail_line {
            TailLine::Header => return None,
            TailLine::GivingUp => return Some(LoopOutcome::Restart),
            TailLine::Reappeared => {
                let detail = self.log_detail.lock().await;
                self.hooks
                    .notify_tail_event(Severity::Warning, "tail reconnected", "", "tail_reader.rs", 0, Utc::now())
                    .await;
                drop(detail);
                return None;
            }
            TailLine::OtherWarning(raw) => {
                warn!(line = %raw, "dropped unrecognized tail diagnostic line");
                return None;
            }
            TailLine::Payload(raw) => raw,
        };

        if line.trim().is_empty() {
            return None;
        }

        self.process_payload_line(&line).await;
        None
    }

    async fn process_payload_line(&self, line: &str) {
        if let Some(ts) = extract_log_timestamp(line) {
            self.log_detail.lock().await.processed_timestamp = Some(ts.to_string());
            if let Err(e) = self.checkpoint.set(ts) {
                warn!(error = %e, "checkpoint write failed, continuing");
            }
        }

        let suppression = self.suppression.current();
        let detail = self.log_detail.lock().await.clone();

        for rule in detail.prefix_rules() {
            match classify_line(line, rule, &detail) {
                ClassifyOutcome::NoMatch => continue,
                ClassifyOutcome::Matched { event, truncated } => {
                    if truncated {
                        self.hooks
                            .notify_error(
                                &format!("brief truncated to {} bytes", crate::classifier::MAX_BRIEF_BYTES),
                                "classifier.rs",
                                0,
                                Utc::now(),
                            )
                            .await;
                    }
                    if suppression.matches(event.brief_detail().0) {
                        break;
                    }
                    self.dispatch(rule.callable_name(), event).await;
                }
            }
        }
    }

    async fn dispatch(&self, callable_name: &str, event: Event) {
        let Some(handler) = self.handlers.get(callable_name).cloned() else {
            self.hooks
                .notify_error(&format!("handler {callable_name:?} is not resolvable"), "tail_executor.rs", 0, Utc::now())
                .await;
            return;
        };

        let event_for_log = event.clone();
        let result = tokio::spawn(async move { handler.handle(event).await }).await;
        if let Err(join_err) = result {
            warn!(handler = callable_name, event = ?event_for_log, error = %join_err, "handler panicked");
            self.hooks
                .notify_error(&format!("handler {callable_name:?} panicked: {join_err}"), "tail_executor.rs", 0, Utc::now())
                .await;
        }
    }
}

#[derive(Debug, PartialEq)]
enum LoopOutcome {
    Restart,
    Stop,
}

/// Scan `line` for the first timestamp, per spec.md §4.6 step 4, returning
/// the literal matched text untouched — the checkpoint stores the log's own
/// format, never a reparsed or reformatted one. Parsing is attempted only to
/// reject a regex false-positive; a match that doesn't actually parse as a
/// timestamp in one of the known log forms is treated as no match at all.
#[allow(clippy::expect_used)]
fn extract_log_timestamp(line: &str) -> Option<&str> {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        regex::Regex::new(r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:\d{2})?")
            .expect("static timestamp pattern is valid")
    });
    let m = re.find(line)?;
    let matched = m.as_str();

    let parses = chrono::DateTime::parse_from_rfc3339(matched).is_ok()
        || chrono::NaiveDateTime::parse_from_str(matched, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || chrono::NaiveDateTime::parse_from_str(matched, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || chrono::NaiveDateTime::parse_from_str(matched, "%Y-%m-%d %H:%M:%S,%3f").is_ok();

    parses.then_some(matched)
}

#[cfg(test)]
#[path = "tail_executor_tests.rs"]
mod tests;
