// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batching queue handler (spec.md §4.3): drains an unbounded FIFO of
//! [`BatchRecord`]s into a [`SinkAdapter`] with count and time triggers, and
//! routes the sink's three distinguishable failure modes per its contract.

use lt_adapters::{SinkAdapter, SinkError};
use lt_core::BatchRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;
use tracing::{info, warn};

struct QueuedRecord {
    enqueued_at: Instant,
    record: BatchRecord,
}

/// The FIFO records wait in before they are batched. Supports re-enqueuing
/// surviving records at the head after a partial-miss response, which a
/// plain mpsc channel cannot do.
pub struct BatchQueue {
    inner: Mutex<VecDeque<QueuedRecord>>,
    notify: Notify,
}

impl BatchQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        })
    }

    pub fn push_back(&self, record: BatchRecord) {
        self.inner.lock().push_back(QueuedRecord {
            enqueued_at: Instant::now(),
            record,
        });
        self.notify.notify_one();
    }

    fn requeue_front(&self, records: Vec<QueuedRecord>) {
        let mut q = self.inner.lock();
        for qr in records.into_iter().rev() {
            q.push_front(qr);
        }
        if !q.is_empty() {
            self.notify.notify_one();
        }
    }

    async fn wait_and_pop(&self, timeout: Duration) -> Option<QueuedRecord> {
        if let Some(item) = self.inner.lock().pop_front() {
            return Some(item);
        }
        let notified = self.notify.notified();
        tokio::select! {
            _ = notified => self.inner.lock().pop_front(),
            _ = tokio::time::sleep(timeout) => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

/// What happened on one delivery attempt — returned by [`BatchingHandler::run_once`]
/// so tests can drive and assert on individual cycles without racing a
/// background task.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// No delivery attempt was made this cycle (still accumulating).
    Pending,
    Delivered { count: usize },
    PartialMiss { delivered: usize, errored: usize },
    ConnectionRefused { dropped: usize },
    Other { errored: usize },
}

/// Drains `queue` into `sink`, routing failures per spec.md §4.3.
pub struct BatchingHandler {
    queue: Arc<BatchQueue>,
    sink: Arc<dyn SinkAdapter>,
    count_trigger: usize,
    time_trigger: Duration,
    connection_refused_backoff: Duration,
    error_tx: mpsc::UnboundedSender<Vec<BatchRecord>>,
}

impl BatchingHandler {
    pub fn new(
        queue: Arc<BatchQueue>,
        sink: Arc<dyn SinkAdapter>,
        count_trigger: usize,
        time_trigger: Duration,
        connection_refused_backoff: Duration,
        error_tx: mpsc::UnboundedSender<Vec<BatchRecord>>,
    ) -> Self {
        Self {
            queue,
            sink,
            count_trigger,
            time_trigger,
            connection_refused_backoff,
            error_tx,
        }
    }

    pub fn queue(&self) -> &Arc<BatchQueue> {
        &self.queue
    }

    /// Run until the handle is dropped. In practice spawned as its own task
    /// per tail target's performance-sample stream.
    pub async fn run(&self) {
        let mut pending: Vec<QueuedRecord> = Vec::new();
        loop {
            let _ = self.run_once(&mut pending).await;
        }
    }

    /// One iteration of the pseudocontract in spec.md §4.3: wait up to the
    /// remaining time budget for an arrival, append it if the batch is still
    /// under `count_trigger`, otherwise deliver whatever is pending.
    pub(crate) async fn run_once(&self, pending: &mut Vec<QueuedRecord>) -> BatchOutcome {
        let remaining = match pending.first() {
            None => self.time_trigger,
            Some(oldest) => self.time_trigger.saturating_sub(oldest.enqueued_at.elapsed()),
        };

        if remaining >= Duration::from_secs(1) {
            if let Some(item) = self.queue.wait_and_pop(remaining).await {
                pending.push(item);
                if pending.len() < self.count_trigger {
                    return BatchOutcome::Pending;
                }
            } else if pending.is_empty() {
                return BatchOutcome::Pending;
            }
        }

        if pending.is_empty() {
            return BatchOutcome::Pending;
        }

        self.deliver(std::mem::take(pending)).await
    }

    async fn deliver(&self, batch: Vec<QueuedRecord>) -> BatchOutcome {
        let records: Vec<BatchRecord> = batch.iter().map(|qr| qr.record.clone()).collect();
        match self.sink.send_batch(&records).await {
            Ok(()) => {
                info!(count = records.len(), "batch delivered");
                BatchOutcome::Delivered { count: records.len() }
            }
            Err(SinkError::PartialMiss(missing_ids)) => {
                let (errored, survivors): (Vec<_>, Vec<_>) = batch
                    .into_iter()
                    .partition(|qr| missing_ids.iter().any(|id| id.as_str() == qr.record.id.as_str()));
                let errored_records: Vec<BatchRecord> = errored.into_iter().map(|qr| qr.record).collect();
                warn!(errored = errored_records.len(), survivors = survivors.len(), "sink reported partial miss");
                if !errored_records.is_empty() {
                    let _ = self.error_tx.send(errored_records.clone());
                }
                let delivered = survivors.len();
                self.queue.requeue_front(survivors);
                BatchOutcome::PartialMiss {
                    delivered,
                    errored: errored_records.len(),
                }
            }
            Err(SinkError::ConnectionRefused) => {
                warn!(backoff_secs = self.connection_refused_backoff.as_secs(), "sink connection refused, backing off");
                tokio::time::sleep(self.connection_refused_backoff).await;
                BatchOutcome::ConnectionRefused { dropped: records.len() }
            }
            Err(SinkError::Other(reason)) => {
                warn!(reason = %reason, count = records.len(), "sink delivery failed");
                let _ = self.error_tx.send(records.clone());
                BatchOutcome::Other { errored: records.len() }
            }
        }
    }
}

#[cfg(test)]
#[path = "batching_tests.rs"]
mod tests;
