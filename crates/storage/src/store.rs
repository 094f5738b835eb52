// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed store with replay on open
//!
//! Every mutation goes through [`Store::persist`]: the operation is made
//! durable first, then applied to the materialized state. Readers get owned
//! snapshots, so a reader never observes a half-applied write.

use crate::error::StorageError;
use crate::operation::Operation;
use crate::state::MaterializedState;
use crate::wal::Wal;
use cg_core::{
    first_pending, ArtifactFile, Build, BuildEvent, BuildId, Clock, Config, Effect,
    EraseOutcome, IdGen, Pipeline, PipelineId, PipelineView, Project, ProjectId, Runner,
    RunnerId, RunnerMatcher, SequentialIdGen, Status, StatusCache, SystemClock, UserId,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const WAL_FILE: &str = "wal.jsonl";

/// Owned, consistent copy of one pipeline and its builds
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub pipeline: Pipeline,
    /// Every row, retries included, ascending by id
    pub builds: Vec<Build>,
    pub version: u64,
}

impl Snapshot {
    pub fn view(&self) -> PipelineView<'_> {
        PipelineView::new(&self.pipeline, &self.builds)
    }
}

/// Durable store for projects, pipelines, builds and runners
pub struct Store<C: Clock = SystemClock> {
    dir: PathBuf,
    wal: Wal,
    state: MaterializedState,
    ids: SequentialIdGen,
    cache: StatusCache,
    clock: C,
    config: Config,
}

impl Store<SystemClock> {
    /// Open or create a store in `dir`
    pub fn open(dir: &Path, config: Config) -> Result<Self, StorageError> {
        Self::open_with_clock(dir, config, SystemClock)
    }
}

impl<C: Clock> Store<C> {
    pub fn open_with_clock(dir: &Path, config: Config, clock: C) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;
        let wal_path = dir.join(WAL_FILE);

        let replay = Wal::replay(&wal_path)?;
        let mut state = MaterializedState::new();
        for entry in &replay.entries {
            state.apply(&entry.operation);
        }
        let ids = SequentialIdGen::new();
        ids.observe(state.max_id());

        let wal = Wal::open(&wal_path)?;
        tracing::info!(
            dir = %dir.display(),
            entries = replay.entries.len(),
            sequence = wal.sequence(),
            "store opened"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            wal,
            state,
            ids,
            cache: StatusCache::new(),
            clock,
            config,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Generator for new row ids; always ahead of every id on disk
    pub fn id_gen(&self) -> &SequentialIdGen {
        &self.ids
    }

    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    fn persist(&mut self, op: Operation) -> Result<(), StorageError> {
        let timestamp_micros = u64::try_from(self.clock.now().timestamp_micros()).unwrap_or(0);
        let sequence = self.wal.append(op.clone(), timestamp_micros)?;
        for pipeline_id in op.affected_pipelines() {
            self.cache.invalidate(pipeline_id);
        }
        self.state.apply(&op);
        tracing::info!(op = op.name(), sequence, "operation persisted");
        Ok(())
    }

    // -- lookups --

    pub fn project(&self, id: ProjectId) -> Result<&Project, StorageError> {
        self.state
            .projects
            .get(&id)
            .ok_or_else(|| StorageError::not_found("project", id))
    }

    pub fn pipeline(&self, id: PipelineId) -> Result<&Pipeline, StorageError> {
        self.state
            .pipelines
            .get(&id)
            .ok_or_else(|| StorageError::not_found("pipeline", id))
    }

    pub fn build(&self, id: BuildId) -> Result<&Build, StorageError> {
        self.state
            .builds
            .get(&id)
            .ok_or_else(|| StorageError::not_found("build", id))
    }

    pub fn runner(&self, id: RunnerId) -> Result<&Runner, StorageError> {
        self.state
            .runners
            .get(&id)
            .ok_or_else(|| StorageError::not_found("runner", id))
    }

    pub fn pipelines(&self) -> impl Iterator<Item = &Pipeline> {
        self.state.pipelines.values()
    }

    pub fn runners(&self) -> Vec<Runner> {
        self.state.runners.values().cloned().collect()
    }

    // -- writes --

    pub fn upsert_project(&mut self, project: Project) -> Result<(), StorageError> {
        self.persist(Operation::ProjectUpsert { project })
    }

    pub fn upsert_runner(&mut self, runner: Runner) -> Result<(), StorageError> {
        self.persist(Operation::RunnerUpsert { runner })
    }

    /// Record that a runner checked in now
    pub fn contact_runner(&mut self, id: RunnerId) -> Result<Runner, StorageError> {
        let runner = self.runner(id)?.clone().with_contacted_at(self.clock.now());
        self.upsert_runner(runner.clone())?;
        Ok(runner)
    }

    /// Create an empty pipeline for a commit of an existing project
    pub fn create_pipeline(
        &mut self,
        project_id: ProjectId,
        git_ref: &str,
        sha: &str,
        tag: bool,
    ) -> Result<Pipeline, StorageError> {
        self.project(project_id)?;
        let pipeline =
            Pipeline::new(self.ids.next(), project_id, git_ref, sha, &self.clock).with_tag(tag);
        self.persist(Operation::PipelineCreate {
            pipeline: pipeline.clone(),
        })?;
        Ok(pipeline)
    }

    /// Insert new build rows as a single log entry. Ids must be unused and
    /// pipelines must exist; nothing is written unless every row is valid.
    pub fn insert_builds(&mut self, builds: Vec<Build>) -> Result<(), StorageError> {
        let mut seen = HashSet::with_capacity(builds.len());
        for build in &builds {
            self.pipeline(build.pipeline_id)?;
            if self.state.builds.contains_key(&build.id) || !seen.insert(build.id) {
                return Err(StorageError::AlreadyExists {
                    kind: "build",
                    id: build.id.to_string(),
                });
            }
        }
        if builds.is_empty() {
            return Ok(());
        }
        for build in &builds {
            self.ids.observe(build.id.0);
        }
        self.persist(Operation::BuildBatchInsert { builds })
    }

    /// Apply a state-machine event to a build
    pub fn transition(
        &mut self,
        id: BuildId,
        event: BuildEvent,
    ) -> Result<(Build, Vec<Effect>), StorageError> {
        let (next, effects) = self.build(id)?.transition(event, &self.clock)?;
        self.persist(Operation::BuildUpdate {
            build: next.clone(),
        })?;
        Ok((next, effects))
    }

    /// Insert a new attempt of a complete build; the original row stays as history
    pub fn retry(&mut self, id: BuildId) -> Result<(Build, Vec<Effect>), StorageError> {
        let retry_id = self.ids.next();
        let (retry, effects) = self.build(id)?.retry(retry_id, &self.clock)?;
        self.persist(Operation::BuildInsert {
            build: retry.clone(),
        })?;
        Ok((retry, effects))
    }

    /// Cancel every pending or running current attempt of a pipeline
    pub fn cancel_running(
        &mut self,
        pipeline_id: PipelineId,
    ) -> Result<(Vec<Build>, Vec<Effect>), StorageError> {
        let snapshot = self.snapshot(pipeline_id)?;
        let targets: Vec<BuildId> = snapshot
            .view()
            .cancelable_builds()
            .iter()
            .map(|b| b.id)
            .collect();

        let mut canceled = Vec::with_capacity(targets.len());
        let mut effects = Vec::new();
        for id in targets {
            let (build, build_effects) = self.transition(id, BuildEvent::Cancel)?;
            canceled.push(build);
            effects.extend(build_effects);
        }
        tracing::info!(pipeline = %pipeline_id, builds = canceled.len(), "pipeline canceled");
        Ok((canceled, effects))
    }

    /// Retry every failed or canceled current attempt of a pipeline
    pub fn retry_failed(
        &mut self,
        pipeline_id: PipelineId,
    ) -> Result<(Vec<Build>, Vec<Effect>), StorageError> {
        let snapshot = self.snapshot(pipeline_id)?;
        let targets: Vec<BuildId> = snapshot
            .view()
            .retryable_builds()
            .iter()
            .map(|b| b.id)
            .collect();

        let mut retries = Vec::with_capacity(targets.len());
        let mut effects = Vec::new();
        for id in targets {
            let (retry, retry_effects) = self.retry(id)?;
            retries.push(retry);
            effects.extend(retry_effects);
        }
        tracing::info!(pipeline = %pipeline_id, builds = retries.len(), "pipeline retried");
        Ok((retries, effects))
    }

    pub fn erase(
        &mut self,
        id: BuildId,
        erased_by: Option<UserId>,
    ) -> Result<EraseOutcome, StorageError> {
        let mut build = self.build(id)?.clone();
        let outcome = build.erase(erased_by, &self.clock);
        if outcome.is_erased() {
            self.persist(Operation::BuildUpdate { build })?;
        }
        Ok(outcome)
    }

    /// Append output to a build's trace
    pub fn append_trace(&mut self, id: BuildId, output: &str) -> Result<Build, StorageError> {
        let mut build = self.build(id)?.clone();
        build.append_trace(output)?;
        self.persist(Operation::BuildUpdate {
            build: build.clone(),
        })?;
        Ok(build)
    }

    pub fn keep_artifacts(&mut self, id: BuildId) -> Result<Build, StorageError> {
        let mut build = self.build(id)?.clone();
        build.keep_artifacts();
        self.persist(Operation::BuildUpdate {
            build: build.clone(),
        })?;
        Ok(build)
    }

    /// Set artifact expiry relative to now; invalid input leaves the build untouched
    pub fn set_expire_in(
        &mut self,
        id: BuildId,
        value: Option<&str>,
    ) -> Result<Build, StorageError> {
        let mut build = self.build(id)?.clone();
        build.set_expire_in(value, &self.clock)?;
        self.persist(Operation::BuildUpdate {
            build: build.clone(),
        })?;
        Ok(build)
    }

    pub fn attach_artifacts(
        &mut self,
        id: BuildId,
        archive: ArtifactFile,
        metadata: Option<ArtifactFile>,
    ) -> Result<Build, StorageError> {
        let mut build = self.build(id)?.clone();
        build.attach_artifacts(archive, metadata, &self.config, &self.clock)?;
        self.persist(Operation::BuildUpdate {
            build: build.clone(),
        })?;
        Ok(build)
    }

    /// Drop every expired archive and return the blob deletions to execute
    pub fn remove_expired_artifacts(&mut self) -> Result<Vec<Effect>, StorageError> {
        let expired: Vec<Build> = self
            .state
            .builds
            .values()
            .filter(|b| b.artifacts.archive.is_some() && b.artifacts_expired(&self.clock))
            .cloned()
            .collect();

        let mut effects = Vec::new();
        for mut build in expired {
            effects.extend(build.remove_expired_artifacts(&self.clock));
            self.persist(Operation::BuildUpdate { build })?;
        }
        Ok(effects)
    }

    // -- derived reads --

    pub fn snapshot(&self, pipeline_id: PipelineId) -> Result<Snapshot, StorageError> {
        let pipeline = self.pipeline(pipeline_id)?.clone();
        Ok(Snapshot {
            pipeline,
            builds: self
                .state
                .builds_for(pipeline_id)
                .into_iter()
                .cloned()
                .collect(),
            version: self.state.version(pipeline_id),
        })
    }

    /// Pipeline status through the read-through cache
    pub fn pipeline_status(&self, pipeline_id: PipelineId) -> Result<Status, StorageError> {
        self.pipeline(pipeline_id)?;
        let version = self.state.version(pipeline_id);
        Ok(self.cache.get_or_compute(pipeline_id, version, || {
            cg_core::pipeline_status(&self.state.builds_for(pipeline_id))
        }))
    }

    /// Pending builds ready for dispatch: current attempts, not manual,
    /// and not waiting on earlier stages
    pub fn ready_builds(&self) -> Vec<Build> {
        self.state
            .pipelines
            .keys()
            .filter_map(|id| self.snapshot(*id).ok())
            .flat_map(|snapshot| {
                let view = snapshot.view();
                view.latest()
                    .into_iter()
                    .filter(|b| b.status == Status::Pending && !b.is_manual())
                    .filter(|b| !view.is_blocked(b))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Next build `runner` should pick: earliest created, ties by id
    pub fn next_for_runner(&self, runner_id: RunnerId) -> Result<Option<Build>, StorageError> {
        let runner = self.runner(runner_id)?;
        let candidates: Vec<Build> = self
            .ready_builds()
            .into_iter()
            .filter(|b| {
                self.project(b.project_id)
                    .is_ok_and(|project| runner.can_pick(b, project))
            })
            .collect();
        Ok(first_pending(&candidates).cloned())
    }

    /// Pending builds no online runner can pick
    pub fn stuck_builds(&self) -> Vec<Build> {
        let runners = self.runners();
        let matcher = RunnerMatcher::new(&runners, self.config.runner_liveness, &self.clock);
        self.state
            .pending_builds()
            .into_iter()
            .filter(|b| {
                self.project(b.project_id)
                    .is_ok_and(|project| matcher.is_stuck(b, project))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
