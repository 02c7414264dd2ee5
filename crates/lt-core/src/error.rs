// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error types for the core data model.

use thiserror::Error;

/// Errors raised while constructing or interpreting core data-model values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("pattern {pattern:?} failed to compile: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
