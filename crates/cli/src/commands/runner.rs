// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner commands

use super::{Context, Message};
use crate::output;
use anyhow::Result;
use cg_core::{Clock, ProjectId, Runner, RunnerId, RunnerScope};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct RunnerArgs {
    #[command(subcommand)]
    pub command: RunnerCommand,
}

#[derive(Subcommand)]
pub enum RunnerCommand {
    /// Register a runner; it counts as having just checked in
    Add {
        /// Runner id
        id: u64,
        /// Restrict to these projects (repeatable); shared when omitted
        #[arg(long = "project")]
        projects: Vec<u64>,
        /// Tag offered by the runner (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Register the runner paused
        #[arg(long)]
        paused: bool,
    },
    /// Record a runner check-in
    Contact {
        /// Runner id
        id: u64,
    },
    /// List runners with their online state
    List,
}

#[derive(Serialize)]
struct RunnerInfo {
    id: u64,
    description: String,
    shared: bool,
    projects: Vec<u64>,
    tags: Vec<String>,
    active: bool,
    online: bool,
}

impl RunnerInfo {
    fn new(runner: &Runner, online: bool) -> Self {
        let projects = match &runner.scope {
            RunnerScope::Shared => Vec::new(),
            RunnerScope::Project { projects } => projects.iter().map(|p| p.0).collect(),
        };
        Self {
            id: runner.id.0,
            description: runner.description.clone(),
            shared: matches!(runner.scope, RunnerScope::Shared),
            projects,
            tags: runner.tags.iter().cloned().collect(),
            active: runner.active,
            online,
        }
    }
}

impl fmt::Display for RunnerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = if self.shared {
            "shared".to_string()
        } else {
            let projects: Vec<String> = self.projects.iter().map(u64::to_string).collect();
            format!("projects={}", projects.join(","))
        };
        let state = match (self.active, self.online) {
            (false, _) => "paused",
            (true, true) => "online",
            (true, false) => "offline",
        };
        write!(
            f,
            "{:<6} {:<8} {:<20} tags={}",
            self.id,
            state,
            scope,
            self.tags.join(",")
        )
    }
}

pub fn handle(command: RunnerCommand, ctx: &mut Context) -> Result<()> {
    match command {
        RunnerCommand::Add {
            id,
            projects,
            tags,
            description,
            paused,
        } => {
            let runner = if projects.is_empty() {
                Runner::shared(id)
            } else {
                Runner::for_projects(id, projects.into_iter().map(ProjectId))
            };
            let runner = Runner {
                description,
                ..runner
            }
            .with_tags(tags)
            .with_active(!paused)
            .with_contacted_at(ctx.store.clock().now());
            ctx.store.upsert_runner(runner)?;
            output::print(&Message::new(format!("Added runner {id}")), ctx.format)?;
        }
        RunnerCommand::Contact { id } => {
            ctx.store.contact_runner(RunnerId(id))?;
            output::print(&Message::new(format!("Runner {id} checked in")), ctx.format)?;
        }
        RunnerCommand::List => {
            let liveness = ctx.store.config().runner_liveness;
            let runners: Vec<RunnerInfo> = ctx
                .store
                .runners()
                .iter()
                .map(|r| RunnerInfo::new(r, r.is_online(liveness, ctx.store.clock())))
                .collect();
            output::print_list(&runners, ctx.format, "No runners")?;
        }
    }
    Ok(())
}
