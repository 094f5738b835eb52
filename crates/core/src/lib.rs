// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cg-core: build graph and status aggregation for CI pipelines
//!
//! This crate provides:
//! - A pure state machine for build rows (retries create new rows)
//! - Stage grouping, retry-aware dependency resolution, and status folding
//! - Runner eligibility and stuck detection
//! - Artifact expiry and erasure, expressed as effects
//! - Ordered assembly of execution variables
//!
//! Nothing in here performs I/O. Callers hand in a consistent snapshot of
//! rows and execute the returned effects themselves.

pub mod clock;
pub mod config;
pub mod error;
pub mod id;

// Row types and the state machine (order matters for dependencies)
pub mod status;
pub mod variables;
pub mod artifacts;
pub mod project;
pub mod pipeline;
pub mod build;
pub mod effect;

// Derived views over a snapshot
pub mod aggregate;
pub mod graph;
pub mod runner;
pub mod stage;

#[cfg(test)]
mod test_support;

// Re-exports
pub use aggregate::{exclude_ignored, pipeline_status, stage_status, StatusCache};
pub use artifacts::{expired_artifacts, parse_expire_in, ArtifactFile, Artifacts, EraseOutcome};
pub use build::{Build, BuildEvent, BuildKind, When};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Config, ConfigError};
pub use effect::{Effect, Event};
pub use error::{ConflictError, CoreError, ValidationError};
pub use graph::{depends_on_builds, latest, retried, DependencyGraph, LatestIndex};
pub use id::{BuildId, IdGen, PipelineId, ProjectId, RunnerId, SequentialIdGen, UserId};
pub use pipeline::{Pipeline, PipelineView};
pub use project::Project;
pub use runner::{first_pending, Runner, RunnerMatcher, RunnerScope};
pub use stage::{is_blocked, stage_names, stages, validate_stage_indices, Stage};
pub use status::{Status, StatusView};
pub use variables::{variables, Variable, VariableGroups, VariableList};
