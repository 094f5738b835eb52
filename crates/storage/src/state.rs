// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use crate::operation::Operation;
use cg_core::{Build, BuildId, Pipeline, PipelineId, Project, ProjectId, Runner, RunnerId};
use std::collections::{BTreeMap, HashMap};

/// In-memory state rebuilt by applying operations in sequence order
#[derive(Debug, Default, Clone)]
pub struct MaterializedState {
    pub projects: BTreeMap<ProjectId, Project>,
    pub pipelines: BTreeMap<PipelineId, Pipeline>,
    pub builds: BTreeMap<BuildId, Build>,
    pub runners: BTreeMap<RunnerId, Runner>,
    /// Bumped on every write to a pipeline's builds
    versions: HashMap<PipelineId, u64>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::ProjectUpsert { project } => {
                self.projects.insert(project.id, project.clone());
            }

            Operation::PipelineCreate { pipeline } => {
                self.pipelines.insert(pipeline.id, pipeline.clone());
                self.versions.entry(pipeline.id).or_insert(0);
            }

            Operation::BuildInsert { build } | Operation::BuildUpdate { build } => {
                self.put_build(build);
            }

            Operation::BuildBatchInsert { builds } => {
                for build in builds {
                    self.put_build(build);
                }
            }

            Operation::RunnerUpsert { runner } => {
                self.runners.insert(runner.id, runner.clone());
            }
        }
    }

    fn put_build(&mut self, build: &Build) {
        self.builds.insert(build.id, build.clone());
        *self.versions.entry(build.pipeline_id).or_insert(0) += 1;
    }

    /// Snapshot version of a pipeline's builds; changes on every build write
    pub fn version(&self, pipeline_id: PipelineId) -> u64 {
        self.versions.get(&pipeline_id).copied().unwrap_or(0)
    }

    /// Every row of a pipeline, retries included, ascending by id
    pub fn builds_for(&self, pipeline_id: PipelineId) -> Vec<&Build> {
        self.builds
            .values()
            .filter(|b| b.pipeline_id == pipeline_id)
            .collect()
    }

    /// Pending builds across all pipelines, ascending by id
    pub fn pending_builds(&self) -> Vec<&Build> {
        self.builds.values().filter(|b| b.status == cg_core::Status::Pending).collect()
    }

    /// Largest id in use across builds and pipelines
    pub fn max_id(&self) -> u64 {
        let build = self.builds.keys().next_back().map(|id| id.0).unwrap_or(0);
        let pipeline = self.pipelines.keys().next_back().map(|id| id.0).unwrap_or(0);
        build.max(pipeline)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
