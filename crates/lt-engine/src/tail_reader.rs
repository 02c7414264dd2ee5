// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tail reader (C4): follow-by-name spawn of `tail -F` and resume-point
//! computation.
//!
//! SPEC_FULL §4.4.1 redesigns the original pipe-through-a-line-filter
//! design: this module spawns bare `tail -F` and leaves prefix/suppression
//! matching to the classifier and suppression store, since `regex` makes an
//! external filter process unnecessary. Non-blocking readiness polling
//! (spec.md §4.4 step 3) is likewise provided by tokio's own reactor through
//! `ChildStdout`'s `AsyncRead` rather than hand-rolled `fcntl`/`poll` — the
//! same substrate, reached through the idiomatic async API instead of a
//! manual syscall loop.

use crate::EngineError;
use lt_adapters::process_group::{killpg, spawn_in_new_group};
use lt_core::LogDetail;
use std::io::{BufRead, BufReader as SyncBufReader};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

const LAST_N_LINES_FALLBACK: usize = 10;

/// Where a fresh tail should resume from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePoint {
    /// Start from the file's first line.
    Beginning,
    /// Start from this 1-based line number.
    FromLine(usize),
    /// Start from the last `n` lines (resume timestamp had no match).
    LastN(usize),
}

/// A line read from the tail subprocess's stdout, classified per spec.md
/// §4.4's synthetic diagnostic-line matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailLine {
    /// An actual line of the tailed file.
    Payload(String),
    /// A `==>` filename header, printed when tail follows multiple files.
    Header,
    /// `tail: ... giving up on this name` — the file rotated or vanished.
    GivingUp,
    /// `tail: ... has appeared; following new file` — reconnected after rotation.
    Reappeared,
    /// Any other `tail:`-prefixed diagnostic line.
    OtherWarning(String),
}

/// Classify one line of `tail -F`'s combined stdout/stderr stream.
pub fn classify_tail_line(line: &str) -> TailLine {
    if line.starts_with("==>") {
        TailLine::Header
    } else if let Some(rest) = line.strip_prefix("tail:") {
        if rest.contains("giving up on this name") {
            TailLine::GivingUp
        } else if rest.contains("has appeared; following new file") {
            TailLine::Reappeared
        } else {
            TailLine::OtherWarning(line.to_string())
        }
    } else {
        TailLine::Payload(line.to_string())
    }
}

/// Search `path` for the resume point matching `needle` — the checkpointed
/// timestamp, in the log's own literal format — per spec.md §4.4 step 1: the
/// longest prefix of `needle` that matches the start of some line, taking
/// the first such line. Falls back to the last [`LAST_N_LINES_FALLBACK`]
/// lines if no line matches any prefix.
pub fn compute_resume_point(path: &str, needle: Option<&str>) -> std::io::Result<ResumePoint> {
    let Some(needle) = needle else {
        return Ok(ResumePoint::Beginning);
    };
    let file = std::fs::File::open(path)?;
    let lines: Vec<String> = SyncBufReader::new(file).lines().collect::<Result<_, _>>()?;

    for prefix_len in (1..=needle.len()).rev() {
        let prefix = &needle[..prefix_len];
        if let Some((idx, _)) = lines.iter().enumerate().find(|(_, l)| l.starts_with(prefix)) {
            return Ok(ResumePoint::FromLine(idx + 1));
        }
    }
    Ok(ResumePoint::LastN(LAST_N_LINES_FALLBACK))
}

/// A running `tail -F` subprocess and its line streams. `tail` writes the
/// file's own payload to stdout and its diagnostic lines (`tail: ...`) to
/// stderr — both are read concurrently so a busy diagnostic stream can never
/// block the payload, or vice versa.
pub struct TailReader {
    child: Child,
    stdout_lines: tokio::io::Lines<BufReader<ChildStdout>>,
    stderr_lines: tokio::io::Lines<BufReader<ChildStderr>>,
    stdout_done: bool,
    stderr_done: bool,
}

impl TailReader {
    /// Spawn a tail reader for `log_detail`, resuming per `resume_ts` (see
    /// [`compute_resume_point`]). Returns `Err` if the subprocess could not
    /// be spawned — the caller treats that as "this executor is dead"
    /// (spec.md §4.4 step 5).
    pub fn spawn(log_detail: &LogDetail, resume_ts: Option<&str>) -> Result<Self, EngineError> {
        let resume = compute_resume_point(&log_detail.log_file_path, resume_ts).unwrap_or(ResumePoint::Beginning);

        let mut cmd = Command::new("tail");
        cmd.arg("-F");
        match resume {
            ResumePoint::Beginning => {}
            ResumePoint::FromLine(n) => {
                cmd.arg("-n").arg(format!("+{n}"));
            }
            ResumePoint::LastN(n) => {
                cmd.arg("-n").arg(n.to_string());
            }
        }
        cmd.arg(&log_detail.log_file_path);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = spawn_in_new_group(cmd).map_err(|e| EngineError::ReaderSpawnFailed {
            path: log_detail.log_file_path.clone(),
            reason: e.to_string(),
        })?;

        let stdout = child.stdout.take().ok_or_else(|| EngineError::ReaderSpawnFailed {
            path: log_detail.log_file_path.clone(),
            reason: "tail subprocess has no stdout pipe".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| EngineError::ReaderSpawnFailed {
            path: log_detail.log_file_path.clone(),
            reason: "tail subprocess has no stderr pipe".to_string(),
        })?;

        Ok(Self {
            child,
            stdout_lines: BufReader::new(stdout).lines(),
            stderr_lines: BufReader::new(stderr).lines(),
            stdout_done: false,
            stderr_done: false,
        })
    }

    /// Read the next available line from either stream, classified. Returns
    /// `None` once both streams are closed (the process exited).
    pub async fn next_line(&mut self) -> std::io::Result<Option<TailLine>> {
        loop {
            if self.stdout_done && self.stderr_done {
                return Ok(None);
            }
            tokio::select! {
                line = self.stdout_lines.next_line(), if !self.stdout_done => {
                    match line? {
                        Some(l) => return Ok(Some(classify_tail_line(&l))),
                        None => self.stdout_done = true,
                    }
                }
                line = self.stderr_lines.next_line(), if !self.stderr_done => {
                    match line? {
                        Some(l) => return Ok(Some(classify_tail_line(&l))),
                        None => self.stderr_done = true,
                    }
                }
            }
        }
    }

    /// Kill the tail subprocess's entire process group.
    pub fn kill(&self) -> std::io::Result<()> {
        killpg(self.child.id().unwrap_or(0))
    }
}

#[cfg(test)]
#[path = "tail_reader_tests.rs"]
mod tests;
