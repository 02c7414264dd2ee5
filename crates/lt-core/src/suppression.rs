// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The suppression list: an ordered set of regexes loaded from a text file.
//!
//! This module holds only the in-memory snapshot and its matching logic;
//! the background refresher that keeps it in sync with the backing file
//! (stat, mtime comparison, cooperative file lock) lives in `lt-engine`,
//! since it owns filesystem I/O.

use regex::Regex;

/// An ordered, in-memory snapshot of suppression patterns.
///
/// Created empty; replaced wholesale on reload. A pattern that fails to
/// compile is dropped with its source text recorded in `broken`, so the
/// caller can report it without aborting the whole reload (§4.2: "patterns
/// that fail to compile ... are logged and reported; they do not
/// suppress").
#[derive(Debug, Clone, Default)]
pub struct SuppressionList {
    compiled: Vec<Regex>,
    broken: Vec<String>,
}

impl SuppressionList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from the raw lines of a suppression file, skipping
    /// blank lines and recording uncompilable patterns separately.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut compiled = Vec::new();
        let mut broken = Vec::new();

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            match Regex::new(line) {
                Ok(re) => compiled.push(re),
                Err(_) => broken.push(line.to_string()),
            }
        }

        Self { compiled, broken }
    }

    /// True if any pattern in the list matches `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(text))
    }

    /// Patterns that failed to compile on the last load, for diagnostics.
    pub fn broken_patterns(&self) -> &[String] {
        &self.broken
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }
}

#[cfg(test)]
#[path = "suppression_tests.rs"]
mod tests;
