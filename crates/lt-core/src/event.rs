// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Event` type: a semantic unit extracted from one log line.

use crate::ExecutorId;
use chrono::{DateTime, Utc};

/// Separator that splits an event body into a brief and a detail half.
pub const BRIEF_DETAIL_SEPARATOR: &str = ";;;";

/// A structured unit extracted from a matching log line.
///
/// Produced by the line classifier (one per matching prefix pattern per
/// line) and consumed by the handler named in the owning `LogDetail`'s
/// prefix map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The executor (`service~file_basename`) that produced this event.
    pub executor_id: ExecutorId,
    /// The matched prefix substring.
    pub log_prefix: String,
    /// The body after the prefix, trimmed.
    pub log_message: String,
    /// UTC timestamp extracted from the line, if a timestamp pattern matched.
    pub log_timestamp: Option<DateTime<Utc>>,
    /// Source file basename extracted from the line, if a source pattern matched.
    pub source_file: Option<String>,
    /// Source line number extracted alongside `source_file`.
    pub source_line_number: Option<u32>,
}

impl Event {
    pub fn new(executor_id: ExecutorId, log_prefix: impl Into<String>, log_message: impl Into<String>) -> Self {
        Self {
            executor_id,
            log_prefix: log_prefix.into(),
            log_message: log_message.into(),
            log_timestamp: None,
            source_file: None,
            source_line_number: None,
        }
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.log_timestamp = Some(ts);
        self
    }

    pub fn with_source(mut self, source_file: impl Into<String>, source_line_number: u32) -> Self {
        self.source_file = Some(source_file.into());
        self.source_line_number = Some(source_line_number);
        self
    }

    /// Splits `log_message` into its brief and optional detail half on the
    /// first `;;;` separator.
    pub fn brief_detail(&self) -> (&str, Option<&str>) {
        match self.log_message.split_once(BRIEF_DETAIL_SEPARATOR) {
            Some((brief, detail)) => (brief, Some(detail)),
            None => (&self.log_message, None),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
