// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake sink adapter for testing the batching queue handler.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SinkAdapter, SinkError};
use async_trait::async_trait;
use lt_core::BatchRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// One recorded `send_batch` invocation.
#[derive(Debug, Clone)]
pub struct SinkCall {
    pub records: Vec<BatchRecord>,
}

struct FakeSinkState {
    calls: Vec<SinkCall>,
    scripted: VecDeque<Result<(), SinkError>>,
}

/// Fake sink adapter that records every batch it receives and returns
/// scripted results in order (defaulting to `Ok(())` once the script is
/// exhausted).
#[derive(Clone)]
pub struct FakeSinkAdapter {
    inner: Arc<Mutex<FakeSinkState>>,
}

impl Default for FakeSinkAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSinkState {
                calls: Vec::new(),
                scripted: VecDeque::new(),
            })),
        }
    }
}

impl FakeSinkAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result to return on the next `send_batch` call.
    pub fn push_result(&self, result: Result<(), SinkError>) {
        self.inner.lock().scripted.push_back(result);
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl SinkAdapter for FakeSinkAdapter {
    async fn send_batch(&self, records: &[BatchRecord]) -> Result<(), SinkError> {
        let mut state = self.inner.lock();
        state.calls.push(SinkCall {
            records: records.to_vec(),
        });
        state.scripted.pop_front().unwrap_or(Ok(()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
