// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod artifacts;
pub mod job;
pub mod pipeline;
pub mod project;
pub mod queue;
pub mod runner;

use crate::output::OutputFormat;
use anyhow::Result;
use cg_adapters::{
    EffectExecutor, FileSecretStore, FsArtifactStore, TracedArtifactStore, TracedSecretStore,
};
use cg_core::{Build, Config, Effect, Event, Status};
use cg_storage::Store;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Everything a command needs, opened once per invocation
pub struct Context {
    pub store: Store,
    pub executor: EffectExecutor<TracedArtifactStore<FsArtifactStore>>,
    pub secrets: TracedSecretStore<FileSecretStore>,
    pub format: OutputFormat,
}

impl Context {
    /// Open the store at `state_dir`; artifacts live in `artifacts/`,
    /// secrets in `secrets.toml`
    pub fn open(state_dir: &Path, config: Config, format: OutputFormat) -> Result<Self> {
        let store = Store::open(state_dir, config)?;
        let artifacts = FsArtifactStore::new(state_dir.join("artifacts"));
        let secrets = FileSecretStore::new(state_dir.join("secrets.toml"));
        Ok(Self {
            store,
            executor: EffectExecutor::new(TracedArtifactStore::new(artifacts)),
            secrets: TracedSecretStore::new(secrets),
            format,
        })
    }

    /// Execute effects returned by a store write
    pub async fn execute(&self, effects: Vec<Effect>) -> Result<Vec<Event>> {
        Ok(self.executor.execute_all(effects).await?)
    }
}

/// Serializable summary of one build row
#[derive(Serialize)]
pub struct BuildInfo {
    pub id: u64,
    pub pipeline_id: u64,
    pub name: String,
    pub stage: String,
    pub stage_idx: u32,
    pub status: Status,
    pub when: &'static str,
    pub allow_failure: bool,
    pub runner_id: Option<u64>,
    pub retried: bool,
}

impl BuildInfo {
    pub fn new(build: &Build) -> Self {
        Self {
            id: build.id.0,
            pipeline_id: build.pipeline_id.0,
            name: build.name.clone(),
            stage: build.stage.clone(),
            stage_idx: build.stage_idx,
            status: build.status,
            when: build.when.name(),
            allow_failure: build.allow_failure,
            runner_id: build.runner_id.map(|id| id.0),
            retried: false,
        }
    }

    pub fn retried(mut self, retried: bool) -> Self {
        self.retried = retried;
        self
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6} {:<20} {:<10} {}",
            self.id, self.name, self.stage, self.status
        )?;
        if self.allow_failure && self.status == Status::Failed {
            write!(f, " (allowed to fail)")?;
        }
        if self.retried {
            write!(f, " [retried]")?;
        }
        Ok(())
    }
}

/// Confirmation printed after a write
#[derive(Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
