// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline record and the derived view over its builds
//!
//! A pipeline stores no status of its own. Everything interesting about it
//! is computed from the build rows of a snapshot through [`PipelineView`].

use crate::aggregate;
use crate::build::Build;
use crate::clock::Clock;
use crate::graph::{self, DependencyGraph};
use crate::id::{PipelineId, ProjectId};
use crate::project::Project;
use crate::runner::RunnerMatcher;
use crate::stage::{self, Stage};
use crate::status::{Status, StatusView};
use crate::variables::{slugify, VariableList};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SHORT_SHA_LEN: usize = 8;

/// A pipeline run for one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub project_id: ProjectId,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub sha: String,
    #[serde(default)]
    pub before_sha: Option<String>,
    /// Whether `git_ref` names a tag rather than a branch
    #[serde(default)]
    pub tag: bool,
    pub created_at: DateTime<Utc>,
}

impl Pipeline {
    pub fn new(
        id: impl Into<PipelineId>,
        project_id: impl Into<ProjectId>,
        git_ref: impl Into<String>,
        sha: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            git_ref: git_ref.into(),
            sha: sha.into(),
            before_sha: None,
            tag: false,
            created_at: clock.now(),
        }
    }

    pub fn with_before_sha(self, before_sha: impl Into<String>) -> Self {
        Self {
            before_sha: Some(before_sha.into()),
            ..self
        }
    }

    pub fn with_tag(self, tag: bool) -> Self {
        Self { tag, ..self }
    }

    pub fn short_sha(&self) -> &str {
        self.sha.get(..SHORT_SHA_LEN).unwrap_or(&self.sha)
    }

    pub fn ref_slug(&self) -> String {
        slugify(&self.git_ref)
    }

    pub fn predefined_variables(&self) -> VariableList {
        let mut variables = VariableList::new();
        variables.append("CI_PIPELINE_ID", self.id.to_string());
        variables.append("CI_PIPELINE_CREATED_AT", self.created_at.to_rfc3339());
        variables.append("CI_COMMIT_SHA", &self.sha);
        variables.append("CI_COMMIT_SHORT_SHA", self.short_sha());
        if let Some(before_sha) = &self.before_sha {
            variables.append("CI_COMMIT_BEFORE_SHA", before_sha);
        }
        variables.append("CI_COMMIT_REF_NAME", &self.git_ref);
        variables.append("CI_COMMIT_REF_SLUG", self.ref_slug());
        if self.tag {
            variables.append("CI_COMMIT_TAG", &self.git_ref);
        } else {
            variables.append("CI_COMMIT_BRANCH", &self.git_ref);
        }
        variables
    }
}

/// Derived, read-only view of a pipeline over a snapshot of its builds
pub struct PipelineView<'a> {
    pub pipeline: &'a Pipeline,
    builds: Vec<&'a Build>,
}

impl<'a> PipelineView<'a> {
    /// Builds belonging to other pipelines are ignored
    pub fn new(pipeline: &'a Pipeline, builds: &'a [Build]) -> Self {
        Self {
            pipeline,
            builds: builds
                .iter()
                .filter(|b| b.pipeline_id == pipeline.id)
                .collect(),
        }
    }

    /// Every row, retries included
    pub fn builds(&self) -> &[&'a Build] {
        &self.builds
    }

    pub fn status(&self) -> Status {
        aggregate::pipeline_status(&self.builds)
    }

    pub fn stages(&self) -> Vec<Stage<'_, &'a Build>> {
        stage::stages(&self.builds)
    }

    pub fn stage_status(&self, stage: &str) -> Status {
        aggregate::stage_status(&self.builds, stage)
    }

    /// Current attempt of every job
    pub fn latest(&self) -> Vec<&'a Build> {
        graph::latest(&self.builds).into_iter().copied().collect()
    }

    /// Superseded attempts
    pub fn retried(&self) -> Vec<&'a Build> {
        graph::retried(&self.builds).into_iter().copied().collect()
    }

    pub fn dependency_graph(&self) -> DependencyGraph<'_, &'a Build> {
        DependencyGraph::new(&self.builds)
    }

    pub fn depends_on(&self, build: &Build) -> Vec<&'a Build> {
        graph::depends_on_builds(&self.builds, build)
            .into_iter()
            .copied()
            .collect()
    }

    pub fn is_blocked(&self, build: &Build) -> bool {
        stage::is_blocked(&self.builds, build)
    }

    /// Any current pending build that no online runner can pick
    pub fn is_stuck<C: Clock>(&self, matcher: &RunnerMatcher<'_, C>, project: &Project) -> bool {
        self.latest()
            .into_iter()
            .any(|b| matcher.is_stuck(b, project))
    }

    /// Current attempts that failed or were canceled, ascending by id
    pub fn retryable_builds(&self) -> Vec<&'a Build> {
        self.latest()
            .into_iter()
            .filter(|b| matches!(b.status(), Status::Failed | Status::Canceled))
            .collect()
    }

    /// Current attempts still pending or running, ascending by id
    pub fn cancelable_builds(&self) -> Vec<&'a Build> {
        self.latest()
            .into_iter()
            .filter(|b| b.is_cancelable())
            .collect()
    }

    pub fn is_retryable(&self) -> bool {
        !self.retryable_builds().is_empty()
    }

    pub fn is_cancelable(&self) -> bool {
        !self.cancelable_builds().is_empty()
    }

    /// When the first current attempt started
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.latest().iter().filter_map(|b| b.started_at).min()
    }

    /// When the last current attempt finished, once the pipeline is complete
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        if self.status().is_active() {
            return None;
        }
        self.latest().iter().filter_map(|b| b.finished_at).max()
    }

    /// Wait between creation and the first build starting. `None` until a
    /// build starts or when nothing waited.
    pub fn queued_duration(&self) -> Option<Duration> {
        let waited = (self.started_at()? - self.pipeline.created_at).to_std().ok()?;
        (!waited.is_zero()).then_some(waited)
    }

    /// Wall time during which at least one current attempt was running.
    ///
    /// Overlapping runs count once and gaps between them are not counted.
    pub fn duration(&self) -> Option<Duration> {
        let mut periods: Vec<(DateTime<Utc>, DateTime<Utc>)> = self
            .latest()
            .iter()
            .filter_map(|b| Some((b.started_at?, b.finished_at?)))
            .filter(|(start, end)| start <= end)
            .collect();
        periods.sort();

        let mut periods = periods.into_iter();
        let (mut start, mut end) = periods.next()?;
        let mut total = TimeDelta::zero();
        for (next_start, next_end) in periods {
            if next_start > end {
                total += end - start;
                start = next_start;
            }
            end = end.max(next_end);
        }
        total += end - start;
        total.to_std().ok()
    }

    /// Mean coverage over current attempts that report one
    pub fn coverage(&self) -> Option<f64> {
        let values: Vec<f64> = self.latest().iter().filter_map(|b| b.coverage).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
