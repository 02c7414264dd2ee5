// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ProductionHooks`]: the daemon's concrete [`lt_engine::TailHooks`]
//! implementation (SPEC_FULL §4.9).
//!
//! Structural events (`notify_tail_event`, `notify_error`) are only logged
//! through `tracing`. Conditions the operator should actually see
//! (no-activity, unexpected-activity, tail restart) are additionally routed
//! through the shared `Arc<dyn NotifyAdapter>`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lt_adapters::NotifyAdapter;
use lt_core::LogDetail;
use lt_engine::hooks::Severity;
use lt_engine::TailHooks;

pub struct ProductionHooks {
    notify: Arc<dyn NotifyAdapter>,
}

impl ProductionHooks {
    pub fn new(notify: Arc<dyn NotifyAdapter>) -> Self {
        Self { notify }
    }
}

#[async_trait]
impl TailHooks for ProductionHooks {
    async fn notify_no_activity(&self, log_detail: &LogDetail) {
        tracing::warn!(service = %log_detail.service, file = %log_detail.log_file_path, "no activity within threshold");
        let message = format!("{} ({}) has had no activity within its threshold", log_detail.service, log_detail.log_file_path);
        if let Err(err) = self.notify.notify("tail: no activity", &message).await {
            tracing::error!(%err, "failed to deliver no-activity notification");
        }
    }

    async fn notify_unexpected_activity(&self, log_detail: &LogDetail) {
        tracing::warn!(service = %log_detail.service, file = %log_detail.log_file_path, "unexpected activity");
        let message = format!("{} ({}) produced output none of its prefixes matched", log_detail.service, log_detail.log_file_path);
        if let Err(err) = self.notify.notify("tail: unexpected activity", &message).await {
            tracing::error!(%err, "failed to deliver unexpected-activity notification");
        }
    }

    async fn notify_tail_event(
        &self,
        severity: Severity,
        brief: &str,
        detail: &str,
        source_file: &str,
        line_num: u32,
        at: DateTime<Utc>,
    ) {
        match severity {
            Severity::Warning => {
                tracing::warn!(%brief, %detail, %source_file, line_num, %at, "tail event")
            }
            Severity::Error => {
                tracing::error!(%brief, %detail, %source_file, line_num, %at, "tail event")
            }
        }
    }

    async fn notify_error(&self, error_msg: &str, source_file: &str, line_num: u32, at: DateTime<Utc>) {
        tracing::error!(%error_msg, %source_file, line_num, %at, "engine error");
    }

    async fn handle_tail_restart(&self, log_detail: &LogDetail) {
        tracing::warn!(service = %log_detail.service, file = %log_detail.log_file_path, "tail restarting");
        let message = format!("{} ({}) is restarting its tail", log_detail.service, log_detail.log_file_path);
        if let Err(err) = self.notify.notify("tail: restarting", &message).await {
            tracing::error!(%err, "failed to deliver restart notification");
        }
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
