// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `TailHooks`: the capability record a tail executor uses to reach the
//! outside world (SPEC_FULL §4.9).
//!
//! Grounded on
//! `examples/original_source/FluxPythonUtils/log_analyzer/tail_executor.py`'s
//! `@abstractmethod` hook surface (`notify_no_activity`,
//! `notify_unexpected_activity`, `notify_tail_event_in_log_service`,
//! `notify_error`, `handle_tail_restart`), re-architected as a trait object
//! passed into the executor at construction instead of methods a subclass
//! overrides.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lt_core::LogDetail;

/// Severity of a tail-service-internal event reported through
/// [`TailHooks::notify_tail_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[async_trait]
pub trait TailHooks: Send + Sync {
    /// No readiness event arrived within `critical`'s activity threshold.
    async fn notify_no_activity(&self, log_detail: &LogDetail);

    /// Activity arrived that the configured prefixes did not expect.
    async fn notify_unexpected_activity(&self, log_detail: &LogDetail);

    /// A tail-reader-internal condition worth surfacing (e.g. a reconnect
    /// or a dropped `tail:` line), as opposed to a line from the log itself.
    async fn notify_tail_event(
        &self,
        severity: Severity,
        brief: &str,
        detail: &str,
        source_file: &str,
        line_num: u32,
        at: DateTime<Utc>,
    );

    /// An internal fault occurred in the engine itself, not in the tailed
    /// service.
    async fn notify_error(&self, error_msg: &str, source_file: &str, line_num: u32, at: DateTime<Utc>);

    /// The tail reader needs to restart (rotation or subprocess death); the
    /// caller should schedule a fresh `Starting` state for `log_detail`.
    async fn handle_tail_restart(&self, log_detail: &LogDetail);
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHooks, HookCall};

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    pub enum HookCall {
        NoActivity,
        UnexpectedActivity,
        TailEvent { severity: Severity, brief: String },
        Error { message: String },
        Restart,
    }

    struct FakeHooksState {
        calls: Vec<HookCall>,
    }

    /// Records every hook invocation for assertions in executor tests,
    /// mirroring `lt_adapters::FakeNotifyAdapter`'s call-recording shape.
    #[derive(Clone)]
    pub struct FakeHooks {
        inner: Arc<Mutex<FakeHooksState>>,
    }

    impl Default for FakeHooks {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeHooksState { calls: Vec::new() })),
            }
        }
    }

    impl FakeHooks {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<HookCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl TailHooks for FakeHooks {
        async fn notify_no_activity(&self, _log_detail: &LogDetail) {
            self.inner.lock().calls.push(HookCall::NoActivity);
        }

        async fn notify_unexpected_activity(&self, _log_detail: &LogDetail) {
            self.inner.lock().calls.push(HookCall::UnexpectedActivity);
        }

        async fn notify_tail_event(
            &self,
            severity: Severity,
            brief: &str,
            _detail: &str,
            _source_file: &str,
            _line_num: u32,
            _at: DateTime<Utc>,
        ) {
            self.inner.lock().calls.push(HookCall::TailEvent {
                severity,
                brief: brief.to_string(),
            });
        }

        async fn notify_error(&self, error_msg: &str, _source_file: &str, _line_num: u32, _at: DateTime<Utc>) {
            self.inner.lock().calls.push(HookCall::Error {
                message: error_msg.to_string(),
            });
        }

        async fn handle_tail_restart(&self, _log_detail: &LogDetail) {
            self.inner.lock().calls.push(HookCall::Restart);
        }
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
