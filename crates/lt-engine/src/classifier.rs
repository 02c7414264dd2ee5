// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line classifier (spec.md §4.5): a pure function from one raw line and a
//! [`PrefixRule`] to an optional [`Event`]. No I/O, no clock, no state —
//! everything it needs is in its arguments.

use chrono::{DateTime, Local, TimeZone, Utc};
use lt_core::event::BRIEF_DETAIL_SEPARATOR;
use lt_core::{Event, LogDetail, PrefixRule};
use std::path::Path;
use tracing::warn;

/// Maximum size in bytes of an event's brief — the segment of the body
/// before the first `;;;` separator, or the whole body if absent — before
/// it is reported as oversized.
pub const MAX_BRIEF_BYTES: usize = 2048;

/// Outcome of classifying one line against one rule.
pub enum ClassifyOutcome {
    /// The prefix pattern did not match; try the next rule.
    NoMatch,
    /// A match was found, possibly with its brief truncated.
    Matched { event: Event, truncated: bool },
}

/// Apply `rule` to `line`, producing an event if the prefix pattern matches.
///
/// `executor_id` and `service` identify the executor this line came from;
/// they are attached to the resulting event but play no role in matching.
pub fn classify_line(line: &str, rule: &PrefixRule, log_detail: &LogDetail) -> ClassifyOutcome {
    let Some(prefix_match) = rule.pattern().find(line) else {
        return ClassifyOutcome::NoMatch;
    };

    let prefix = prefix_match.as_str().to_string();
    let body = line[prefix_match.end()..].trim();

    // The size policy applies only to the brief (the segment before the
    // first `;;;`), never to the detail half that may follow it.
    let brief = body.split_once(BRIEF_DETAIL_SEPARATOR).map_or(body, |(brief, _)| brief);
    let truncated = brief.len() > MAX_BRIEF_BYTES;

    let log_timestamp = rule.timestamp_pattern().and_then(|re| {
        let captured = re.captures(line)?.get(1)?.as_str();
        match parse_local_timestamp(captured) {
            Ok(ts) => Some(ts),
            Err(_) => {
                warn!(line = %line, pattern = rule.pattern_str(), "could not parse timestamp");
                None
            }
        }
    });

    let (source_file, source_line_number) = rule
        .source_pattern()
        .and_then(|re| {
            let caps = re.captures(line)?;
            let file = caps.get(1)?.as_str();
            let line_no = caps.get(2)?.as_str().parse::<u32>().ok()?;
            Some((basename(file), line_no))
        })
        .unzip();

    // Handlers receive the full body (brief and detail halves both intact);
    // only the notification fired below is concerned with the brief's size.
    let mut event = Event::new(
        lt_core::ExecutorId::new(executor_id_for(log_detail)),
        prefix,
        body,
    );
    if let Some(ts) = log_timestamp {
        event = event.with_timestamp(ts);
    }
    if let (Some(file), Some(line_no)) = (source_file, source_line_number) {
        event = event.with_source(file, line_no);
    }

    ClassifyOutcome::Matched { event, truncated }
}

fn executor_id_for(log_detail: &LogDetail) -> String {
    format!("{}~{}", log_detail.service, basename(&log_detail.log_file_path))
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn parse_local_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")?;
    let local = Local.from_local_datetime(&naive).single();
    Ok(local.map(|dt| dt.with_timezone(&Utc)).unwrap_or_else(|| Utc.from_utc_datetime(&naive)))
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
