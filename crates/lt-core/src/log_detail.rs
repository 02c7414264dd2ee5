// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LogDetail`: the descriptor that defines one tail target.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of the prefix-pattern-to-handler mapping, plus its optional
/// timestamp and source-location extraction patterns.
///
/// The three mappings described in the data model
/// (`log_prefix_regex_pattern_to_callable_name`,
/// `log_prefix_regex_pattern_to_log_date_time_regex_pattern`,
/// `log_prefix_regex_pattern_to_log_source_pattern_n_line_num_regex_pattern`)
/// all share the same key, so they are carried here as one ordered rule
/// instead of three separate maps that would need to be kept in sync.
#[derive(Debug, Clone)]
pub struct PrefixRule {
    pattern: Regex,
    pattern_str: String,
    callable_name: String,
    timestamp_pattern: Option<Regex>,
    source_pattern: Option<Regex>,
}

impl PrefixRule {
    pub fn new(pattern: &str, callable_name: impl Into<String>) -> Result<Self, LogDetailError> {
        Ok(Self {
            pattern: compile(pattern)?,
            pattern_str: pattern.to_string(),
            callable_name: callable_name.into(),
            timestamp_pattern: None,
            source_pattern: None,
        })
    }

    pub fn with_timestamp_pattern(mut self, pattern: &str) -> Result<Self, LogDetailError> {
        self.timestamp_pattern = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn with_source_pattern(mut self, pattern: &str) -> Result<Self, LogDetailError> {
        self.source_pattern = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn pattern_str(&self) -> &str {
        &self.pattern_str
    }

    pub fn callable_name(&self) -> &str {
        &self.callable_name
    }

    pub fn timestamp_pattern(&self) -> Option<&Regex> {
        self.timestamp_pattern.as_ref()
    }

    pub fn source_pattern(&self) -> Option<&Regex> {
        self.source_pattern.as_ref()
    }
}

fn compile(pattern: &str) -> Result<Regex, LogDetailError> {
    Regex::new(pattern).map_err(|source| LogDetailError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Descriptor that defines one tail target: which file to follow, which
/// prefixes route to which handlers, and the poll/criticality policy.
#[derive(Debug, Clone)]
pub struct LogDetail {
    pub service: String,
    pub log_file_path: String,
    pub log_file_path_is_regex: bool,
    prefix_rules: Vec<PrefixRule>,
    pub poll_timeout_seconds: f64,
    pub critical: bool,
    /// The last-processed log line's timestamp, in the log's own literal
    /// format (never reparsed or reformatted — see spec.md §4.1).
    pub processed_timestamp: Option<String>,
    pub is_running: bool,
    pub force_kill: bool,
}

impl LogDetail {
    pub fn new(
        service: impl Into<String>,
        log_file_path: impl Into<String>,
        log_file_path_is_regex: bool,
        prefix_rules: Vec<PrefixRule>,
        poll_timeout_seconds: f64,
        critical: bool,
    ) -> Result<Self, LogDetailError> {
        let service = service.into();
        if service.is_empty() {
            return Err(LogDetailError::EmptyService);
        }
        if prefix_rules.is_empty() {
            return Err(LogDetailError::NoPrefixRules);
        }
        if !(poll_timeout_seconds > 0.0) {
            return Err(LogDetailError::InvalidPollTimeout(poll_timeout_seconds));
        }

        Ok(Self {
            service,
            log_file_path: log_file_path.into(),
            log_file_path_is_regex,
            prefix_rules,
            poll_timeout_seconds,
            critical,
            processed_timestamp: None,
            is_running: false,
            force_kill: false,
        })
    }

    /// Rules in declaration order — the match-attempt order the executor
    /// must preserve (§4.6: patterns are not mutually exclusive).
    pub fn prefix_rules(&self) -> &[PrefixRule] {
        &self.prefix_rules
    }

    /// Clones this descriptor with its `log_file_path` replaced by one glob
    /// expansion result, as the watcher does for each matched path.
    pub fn with_expanded_path(&self, expanded_path: impl Into<String>) -> Self {
        Self {
            log_file_path: expanded_path.into(),
            log_file_path_is_regex: false,
            ..self.clone()
        }
    }
}

/// Serializable shape of a `LogDetail` as it appears in the TOML
/// configuration file (one array-of-tables entry per tail target).
///
/// Kept separate from `LogDetail` because the runtime type carries compiled
/// `Regex` values and mutable lifecycle flags that have no business being
/// deserialized or re-serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogDetailConfig {
    pub service: String,
    pub log_file_path: String,
    #[serde(default)]
    pub log_file_path_is_regex: bool,
    pub prefixes: Vec<PrefixRuleConfig>,
    pub poll_timeout_seconds: f64,
    #[serde(default)]
    pub critical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixRuleConfig {
    pub pattern: String,
    pub callable_name: String,
    #[serde(default)]
    pub timestamp_pattern: Option<String>,
    #[serde(default)]
    pub source_pattern: Option<String>,
}

impl LogDetailConfig {
    pub fn into_log_detail(self) -> Result<LogDetail, LogDetailError> {
        let mut rules = Vec::with_capacity(self.prefixes.len());
        for p in self.prefixes {
            let mut rule = PrefixRule::new(&p.pattern, p.callable_name)?;
            if let Some(ts) = &p.timestamp_pattern {
                rule = rule.with_timestamp_pattern(ts)?;
            }
            if let Some(src) = &p.source_pattern {
                rule = rule.with_source_pattern(src)?;
            }
            rules.push(rule);
        }

        LogDetail::new(
            self.service,
            self.log_file_path,
            self.log_file_path_is_regex,
            rules,
            self.poll_timeout_seconds,
            self.critical,
        )
    }
}

#[derive(Debug, Error)]
pub enum LogDetailError {
    #[error("service name must be non-empty")]
    EmptyService,
    #[error("at least one prefix rule is required")]
    NoPrefixRules,
    #[error("poll_timeout_seconds must be > 0, got {0}")]
    InvalidPollTimeout(f64),
    #[error("pattern {pattern:?} failed to compile: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
#[path = "log_detail_tests.rs"]
mod tests;
