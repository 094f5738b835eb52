// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations recorded in the write-ahead log

use cg_core::{Build, Pipeline, PipelineId, Project, Runner};
use serde::{Deserialize, Serialize};

/// A single state change. Applying the same sequence always yields the same state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    ProjectUpsert { project: Project },
    PipelineCreate { pipeline: Pipeline },
    /// A new build row; retries are inserts too
    BuildInsert { build: Build },
    /// New build rows recorded as one entry, so seeding is all or nothing
    BuildBatchInsert { builds: Vec<Build> },
    /// Replace an existing build row
    BuildUpdate { build: Build },
    RunnerUpsert { runner: Runner },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ProjectUpsert { .. } => "project_upsert",
            Operation::PipelineCreate { .. } => "pipeline_create",
            Operation::BuildInsert { .. } => "build_insert",
            Operation::BuildBatchInsert { .. } => "build_batch_insert",
            Operation::BuildUpdate { .. } => "build_update",
            Operation::RunnerUpsert { .. } => "runner_upsert",
        }
    }

    /// Pipelines whose builds this operation changes
    pub fn affected_pipelines(&self) -> Vec<PipelineId> {
        match self {
            Operation::BuildInsert { build } | Operation::BuildUpdate { build } => {
                vec![build.pipeline_id]
            }
            Operation::BuildBatchInsert { builds } => {
                let mut ids: Vec<PipelineId> = builds.iter().map(|b| b.pipeline_id).collect();
                ids.sort();
                ids.dedup();
                ids
            }
            _ => Vec::new(),
        }
    }
}
