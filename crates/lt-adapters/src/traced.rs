// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability.

use crate::notify::{NotifyAdapter, NotifyError};
use crate::sink::{SinkAdapter, SinkError};
use async_trait::async_trait;
use lt_core::BatchRecord;
use tracing::Instrument;

/// Wrapper that adds tracing spans/events around any [`NotifyAdapter`].
#[derive(Clone)]
pub struct TracedNotify<N> {
    inner: N,
}

impl<N> TracedNotify<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotifyAdapter> NotifyAdapter for TracedNotify<N> {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        async {
            tracing::info!(title, "starting");
            let start = std::time::Instant::now();
            let result = self.inner.notify(title, message).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(title, elapsed_ms, "notification sent"),
                Err(e) => tracing::error!(title, elapsed_ms, error = %e, "notify failed"),
            }
            result
        }
        .instrument(tracing::info_span!("notify.send", title))
        .await
    }
}

/// Wrapper that adds tracing spans/events around any [`SinkAdapter`].
#[derive(Clone)]
pub struct TracedSink<S> {
    inner: S,
}

impl<S> TracedSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: SinkAdapter> SinkAdapter for TracedSink<S> {
    async fn send_batch(&self, records: &[BatchRecord]) -> Result<(), SinkError> {
        let count = records.len();
        async {
            tracing::info!(count, "starting");
            let start = std::time::Instant::now();
            let result = self.inner.send_batch(records).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(count, elapsed_ms, "batch delivered"),
                Err(e) => tracing::error!(count, elapsed_ms, error = %e, "batch delivery failed"),
            }
            result
        }
        .instrument(tracing::info_span!("sink.send_batch", count))
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
