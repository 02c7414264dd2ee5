// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `BatchRecord`: a performance sample queued for delivery to the sink.

use crate::BatchRecordId;
use chrono::{DateTime, Utc};

/// One performance sample extracted from a line carrying the
/// `callable_name;;;start_time;;;delta` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRecord {
    pub id: BatchRecordId,
    pub callable_name: String,
    pub start_time: DateTime<Utc>,
    pub delta_ms: f64,
}

impl BatchRecord {
    pub fn new(id: BatchRecordId, callable_name: impl Into<String>, start_time: DateTime<Utc>, delta_ms: f64) -> Self {
        Self {
            id,
            callable_name: callable_name.into(),
            start_time,
            delta_ms,
        }
    }

    /// True if this record's callable matches `performance_callable_name`,
    /// the one handler the executor is configured to never forward to the
    /// sink (avoids feeding a sample about the sink back into itself).
    pub fn is_self_referential(&self, performance_callable_name: &str) -> bool {
        self.callable_name == performance_callable_name
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
