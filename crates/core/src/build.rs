// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build state machine
//!
//! A build is one attempt at running a job. Transitions are pure: they
//! return the next row and the effects the caller should apply. A retry
//! never mutates the original row; it produces a brand-new pending row
//! with a larger id.

use crate::artifacts::Artifacts;
use crate::clock::Clock;
use crate::config::Config;
use crate::effect::{Effect, Event};
use crate::error::{ConflictError, CoreError, ValidationError};
use crate::id::{BuildId, PipelineId, ProjectId, RunnerId, UserId};
use crate::pipeline::Pipeline;
use crate::status::{Status, StatusView};
use crate::variables::{Variable, VariableList};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

/// Condition under which a job runs relative to earlier stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum When {
    #[default]
    OnSuccess,
    OnFailure,
    Always,
    Manual,
}

impl When {
    pub fn name(&self) -> &'static str {
        match self {
            When::OnSuccess => "on_success",
            When::OnFailure => "on_failure",
            When::Always => "always",
            When::Manual => "manual",
        }
    }
}

impl FromStr for When {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_success" => Ok(When::OnSuccess),
            "on_failure" => Ok(When::OnFailure),
            "always" => Ok(When::Always),
            "manual" => Ok(When::Manual),
            other => Err(ValidationError::UnknownWhen(other.to_string())),
        }
    }
}

/// What kind of work a status row stands for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildKind {
    /// Work executed by a runner
    #[default]
    Build,
    /// Triggers a downstream pipeline and mirrors its status
    Bridge { downstream: Option<PipelineId> },
    /// Status reported by an outside system
    External { description: Option<String> },
}

/// Events that can change build state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// A runner picked the build
    Run { runner_id: Option<RunnerId> },
    Succeed,
    Drop,
    Cancel,
    Skip,
}

impl BuildEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BuildEvent::Run { .. } => "run",
            BuildEvent::Succeed => "succeed",
            BuildEvent::Drop => "drop",
            BuildEvent::Cancel => "cancel",
            BuildEvent::Skip => "skip",
        }
    }
}

/// One attempt at a job within a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    pub pipeline_id: PipelineId,
    pub project_id: ProjectId,
    pub name: String,
    pub stage: String,
    pub stage_idx: u32,
    pub status: Status,
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub allow_failure: bool,
    #[serde(default)]
    pub when: When,
    #[serde(default)]
    pub kind: BuildKind,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub runner_id: Option<RunnerId>,
    /// Capabilities a runner must offer to pick this build
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub artifacts: Artifacts,
    #[serde(default)]
    pub trace: Option<String>,
    #[serde(default)]
    pub erased_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub erased_by: Option<UserId>,
    /// Variables declared by the job definition
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub coverage: Option<f64>,
}

impl Build {
    /// Create a pending build for `pipeline`
    pub fn new(
        id: impl Into<BuildId>,
        pipeline: &Pipeline,
        name: impl Into<String>,
        stage: impl Into<String>,
        stage_idx: u32,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: id.into(),
            pipeline_id: pipeline.id,
            project_id: pipeline.project_id,
            name: name.into(),
            stage: stage.into(),
            stage_idx,
            status: Status::Pending,
            git_ref: pipeline.git_ref.clone(),
            allow_failure: false,
            when: When::OnSuccess,
            kind: BuildKind::Build,
            created_at: clock.now(),
            started_at: None,
            finished_at: None,
            runner_id: None,
            tags: BTreeSet::new(),
            artifacts: Artifacts::default(),
            trace: None,
            erased_at: None,
            erased_by: None,
            variables: Vec::new(),
            coverage: None,
        }
    }

    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    pub fn with_ref(self, git_ref: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            ..self
        }
    }

    pub fn with_allow_failure(self, allow_failure: bool) -> Self {
        Self {
            allow_failure,
            ..self
        }
    }

    pub fn with_when(self, when: When) -> Self {
        Self { when, ..self }
    }

    pub fn with_kind(self, kind: BuildKind) -> Self {
        Self { kind, ..self }
    }

    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_variables(self, variables: Vec<Variable>) -> Self {
        Self { variables, ..self }
    }

    pub fn with_artifacts_expire_in(mut self, expire_in: Option<String>) -> Self {
        self.artifacts.expire_in = expire_in;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    /// Started and has not been canceled or skipped since
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
            && matches!(
                self.status,
                Status::Running | Status::Success | Status::Failed
            )
    }

    /// Failed, but allowed to
    pub fn is_ignored(&self) -> bool {
        StatusView::is_ignored(self)
    }

    pub fn is_retryable(&self) -> bool {
        self.is_complete()
    }

    pub fn is_cancelable(&self) -> bool {
        self.is_active()
    }

    pub fn is_manual(&self) -> bool {
        self.when == When::Manual
    }

    /// Time spent running, once finished
    pub fn duration(&self) -> Option<Duration> {
        let started = self.started_at?;
        let finished = self.finished_at?;
        (finished - started).to_std().ok()
    }

    /// Time spent waiting for a runner
    pub fn queued_duration(&self) -> Option<Duration> {
        let started = self.started_at?;
        (started - self.created_at).to_std().ok()
    }

    /// Pure transition function - returns new state and effects
    pub fn transition(
        &self,
        event: BuildEvent,
        clock: &impl Clock,
    ) -> Result<(Build, Vec<Effect>), ConflictError> {
        let now = clock.now();
        let mut build = self.clone();

        match (self.status, &event) {
            // Pending → Running
            (Status::Pending, BuildEvent::Run { runner_id }) => {
                build.status = Status::Running;
                build.started_at = Some(now);
                build.runner_id = *runner_id;
            }

            // Running → Success | Failed
            (Status::Running, BuildEvent::Succeed) => {
                build.status = Status::Success;
                build.finished_at = Some(now);
            }
            (Status::Running, BuildEvent::Drop) => {
                build.status = Status::Failed;
                build.finished_at = Some(now);
            }

            // Pending | Running → Canceled
            (Status::Pending | Status::Running, BuildEvent::Cancel) => {
                build.status = Status::Canceled;
                build.finished_at = Some(now);
            }

            // Pending → Skipped
            (Status::Pending, BuildEvent::Skip) => {
                build.status = Status::Skipped;
            }

            (status, event) if status.is_complete() => {
                tracing::warn!(id = %self.id, %status, event = event.name(), "rejected transition on terminal build");
                return Err(ConflictError::Terminal {
                    id: self.id,
                    status,
                    event: event.name(),
                });
            }
            (status, event) => {
                tracing::warn!(id = %self.id, %status, event = event.name(), "rejected transition");
                return Err(ConflictError::InvalidTransition {
                    id: self.id,
                    status,
                    event: event.name(),
                });
            }
        }

        tracing::debug!(id = %self.id, from = %self.status, to = %build.status, "build transition");
        let effects = vec![Effect::Emit(Event::BuildStatusChanged {
            id: self.id,
            pipeline_id: self.pipeline_id,
            from: self.status,
            to: build.status,
        })];
        Ok((build, effects))
    }

    /// Create the next attempt of this job as a new pending row.
    ///
    /// The original row is left as history; `retry_id` must be larger than
    /// this build's id so it becomes the latest attempt.
    pub fn retry(
        &self,
        retry_id: impl Into<BuildId>,
        clock: &impl Clock,
    ) -> Result<(Build, Vec<Effect>), CoreError> {
        let retry_id = retry_id.into();
        if !self.is_retryable() {
            return Err(ConflictError::NotRetryable {
                id: self.id,
                status: self.status,
            }
            .into());
        }
        if retry_id <= self.id {
            return Err(ValidationError::NonMonotonicRetry {
                original: self.id,
                retry: retry_id,
            }
            .into());
        }

        let retry = Build {
            id: retry_id,
            status: Status::Pending,
            created_at: clock.now(),
            started_at: None,
            finished_at: None,
            runner_id: None,
            artifacts: Artifacts {
                expire_in: self.artifacts.expire_in.clone(),
                ..Artifacts::default()
            },
            trace: None,
            erased_at: None,
            erased_by: None,
            coverage: None,
            ..self.clone()
        };

        tracing::debug!(original = %self.id, retry = %retry_id, name = %self.name, "build retried");
        let effects = vec![Effect::Emit(Event::BuildRetried {
            original: self.id,
            retry: retry_id,
            pipeline_id: self.pipeline_id,
        })];
        Ok((retry, effects))
    }

    /// System variables describing this build
    pub fn predefined_variables(&self, config: &Config) -> VariableList {
        let mut variables = VariableList::new();
        variables.append("CI", "true");
        variables.append("CI_SERVER", "yes");
        variables.append("CI_SERVER_NAME", &config.server_name);
        variables.append("CI_SERVER_URL", &config.server_url);
        variables.append("CI_JOB_ID", self.id.to_string());
        variables.append("CI_JOB_NAME", &self.name);
        variables.append("CI_JOB_STAGE", &self.stage);
        if self.is_manual() {
            variables.append("CI_JOB_MANUAL", "true");
        }
        if let Some(runner_id) = self.runner_id {
            variables.append("CI_RUNNER_ID", runner_id.to_string());
            variables.append(
                "CI_RUNNER_TAGS",
                self.tags.iter().cloned().collect::<Vec<_>>().join(", "),
            );
        }
        // legacy names
        variables.append("CI_BUILD_ID", self.id.to_string());
        variables.append("CI_BUILD_NAME", &self.name);
        variables.append("CI_BUILD_STAGE", &self.stage);
        variables
    }
}

impl StatusView for Build {
    fn id(&self) -> BuildId {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn git_ref(&self) -> &str {
        &self.git_ref
    }
    fn stage(&self) -> &str {
        &self.stage
    }
    fn stage_idx(&self) -> u32 {
        self.stage_idx
    }
    fn status(&self) -> Status {
        self.status
    }
    fn allow_failure(&self) -> bool {
        self.allow_failure
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
