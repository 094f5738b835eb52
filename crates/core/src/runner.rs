// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner eligibility for pending builds
//!
//! Eligibility never consults `stuck` state: stuck detection is derived from
//! eligibility, not the other way round.

use crate::build::Build;
use crate::clock::Clock;
use crate::id::{ProjectId, RunnerId};
use crate::project::Project;
use crate::status::Status;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Which projects a runner serves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunnerScope {
    /// Any project that has shared runners enabled
    Shared,
    /// Only the listed projects
    Project { projects: BTreeSet<ProjectId> },
}

/// An execution agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub id: RunnerId,
    #[serde(default)]
    pub description: String,
    pub active: bool,
    #[serde(default)]
    pub contacted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub scope: RunnerScope,
}

impl Runner {
    pub fn shared(id: impl Into<RunnerId>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            active: true,
            contacted_at: None,
            tags: BTreeSet::new(),
            scope: RunnerScope::Shared,
        }
    }

    pub fn for_projects<I>(id: impl Into<RunnerId>, projects: I) -> Self
    where
        I: IntoIterator<Item = ProjectId>,
    {
        Self {
            scope: RunnerScope::Project {
                projects: projects.into_iter().collect(),
            },
            ..Self::shared(id)
        }
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

    pub fn with_active(self, active: bool) -> Self {
        Self { active, ..self }
    }

    pub fn with_contacted_at(self, contacted_at: DateTime<Utc>) -> Self {
        Self {
            contacted_at: Some(contacted_at),
            ..self
        }
    }

    /// Active and contacted within `liveness`
    pub fn is_online(&self, liveness: Duration, clock: &impl Clock) -> bool {
        let Some(contacted_at) = self.contacted_at else {
            return false;
        };
        let window = TimeDelta::from_std(liveness).unwrap_or(TimeDelta::MAX);
        let cutoff = clock
            .now()
            .checked_sub_signed(window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.active && contacted_at > cutoff
    }

    /// Whether the runner's scope lets it serve `project`
    pub fn permits(&self, project: &Project) -> bool {
        match &self.scope {
            RunnerScope::Shared => project.shared_runners_enabled,
            RunnerScope::Project { projects } => projects.contains(&project.id),
        }
    }

    /// Tag superset and scope check; an untagged build matches any runner
    pub fn can_pick(&self, build: &Build, project: &Project) -> bool {
        build.project_id == project.id && build.tags.is_subset(&self.tags) && self.permits(project)
    }
}

/// Matches builds against a set of registered runners
pub struct RunnerMatcher<'a, C> {
    runners: &'a [Runner],
    liveness: Duration,
    clock: &'a C,
}

impl<'a, C: Clock> RunnerMatcher<'a, C> {
    pub fn new(runners: &'a [Runner], liveness: Duration, clock: &'a C) -> Self {
        Self {
            runners,
            liveness,
            clock,
        }
    }

    /// Online runners able to pick `build`
    pub fn eligible(&self, build: &Build, project: &Project) -> Vec<&'a Runner> {
        self.runners
            .iter()
            .filter(|r| r.is_online(self.liveness, self.clock) && r.can_pick(build, project))
            .collect()
    }

    pub fn any_runners_online(&self, build: &Build, project: &Project) -> bool {
        self.runners
            .iter()
            .any(|r| r.is_online(self.liveness, self.clock) && r.can_pick(build, project))
    }

    /// Pending with nobody to pick it up. A read-only view, never a transition.
    pub fn is_stuck(&self, build: &Build, project: &Project) -> bool {
        build.status == Status::Pending && !self.any_runners_online(build, project)
    }
}

/// Next dispatch candidate: earliest-created pending build, ties by id
pub fn first_pending(builds: &[Build]) -> Option<&Build> {
    builds
        .iter()
        .filter(|b| b.status == Status::Pending)
        .min_by_key(|b| (b.created_at, b.id))
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
