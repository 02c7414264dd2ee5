// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery sink adapters for the batching queue handler.

mod http;

pub use http::HttpSinkAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSinkAdapter, SinkCall};

use async_trait::async_trait;
use lt_core::BatchRecord;
use thiserror::Error;

/// Errors the batching queue handler must distinguish between, per the
/// sink protocol: a partial miss names the offending record ids; a
/// connection-refused condition is treated as transient; everything else
/// is routed to the catch-all error callback.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink rejected {} record(s) by id", .0.len())]
    PartialMiss(Vec<String>),
    #[error("connection refused by sink")]
    ConnectionRefused,
    #[error("sink error: {0}")]
    Other(String),
}

/// Adapter for delivering a batch of records to the downstream collector.
/// Object-safe (no `Clone` supertrait) so callers hold it as `Arc<dyn SinkAdapter>`.
#[async_trait]
pub trait SinkAdapter: Send + Sync + 'static {
    /// Deliver `records` as one bulk call. Ordering within the batch is the
    /// queue's insertion order and must be preserved in the request body.
    async fn send_batch(&self, records: &[BatchRecord]) -> Result<(), SinkError>;
}
