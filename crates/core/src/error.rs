// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types surfaced by the core

use crate::id::BuildId;
use crate::status::Status;
use thiserror::Error;

/// Malformed input handed to the core. Never silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },
    #[error("stage {stage:?} has conflicting indexes {first} and {second}")]
    ConflictingStageIndex {
        stage: String,
        first: u32,
        second: u32,
    },
    #[error("stages {first:?} and {second:?} share index {idx}")]
    SharedStageIndex {
        first: String,
        second: String,
        idx: u32,
    },
    #[error("stage {stage:?} at index {idx} appears after index {previous}")]
    StageOutOfOrder {
        stage: String,
        idx: u32,
        previous: u32,
    },
    #[error("unknown status: {0}")]
    UnknownStatus(String),
    #[error("unknown when condition: {0}")]
    UnknownWhen(String),
    #[error("retry id {retry} does not supersede build {original}")]
    NonMonotonicRetry { original: BuildId, retry: BuildId },
}

/// A transition that the build's current status does not allow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("build {id} is already {status}; cannot {event}")]
    Terminal {
        id: BuildId,
        status: Status,
        event: &'static str,
    },
    #[error("build {id} cannot {event} while {status}")]
    InvalidTransition {
        id: BuildId,
        status: Status,
        event: &'static str,
    },
    #[error("build {id} is {status} and cannot be retried")]
    NotRetryable { id: BuildId, status: Status },
    #[error("build {id} has been erased")]
    Erased { id: BuildId },
}

/// Any error produced by the core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
}
