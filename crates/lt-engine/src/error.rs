// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use lt_adapters::{NotifyError, SinkError};
use lt_core::CoreError;

/// Everything that can go wrong while one tail executor is running, per the
/// error table in spec.md §7.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("checkpoint cell {name:?} unavailable: {reason}")]
    CheckpointUnavailable { name: String, reason: String },

    #[error("suppression file {path:?} could not be read: {reason}")]
    SuppressionUnreadable { path: String, reason: String },

    #[error("data model error: {0}")]
    Core(#[from] CoreError),

    #[error("tail reader for {path:?} failed to start: {reason}")]
    ReaderSpawnFailed { path: String, reason: String },

    #[error("handler name {0:?} is not resolvable")]
    UnknownHandler(String),

    #[error("sink delivery failed: {0}")]
    Sink(#[from] SinkError),

    #[error("notification failed: {0}")]
    Notify(#[from] NotifyError),

    #[error("executor {id} is not running")]
    NotRunning { id: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
