// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job commands: drive one build row through its state machine

use super::{BuildInfo, Context, Message};
use crate::output;
use anyhow::Result;
use cg_adapters::SecretStore;
use cg_core::{BuildEvent, BuildId, RunnerId, Variable};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Start a pending build
    Run {
        /// Build id
        id: u64,
        /// Runner executing the build
        #[arg(long)]
        runner: Option<u64>,
    },
    /// Mark a running build as succeeded
    Succeed { id: u64 },
    /// Mark a running build as failed
    Fail { id: u64 },
    /// Cancel a pending or running build
    Cancel { id: u64 },
    /// Skip a pending build
    Skip { id: u64 },
    /// Create a new attempt of a failed or canceled build
    Retry { id: u64 },
    /// Show one build
    Show { id: u64 },
    /// List the builds this build depends on
    Deps { id: u64 },
    /// Print the execution variables for a build
    Variables { id: u64 },
    /// Append output to a build's trace
    Trace {
        /// Build id
        id: u64,
        /// Output to append
        output: String,
    },
}

#[derive(Serialize)]
struct VariableInfo {
    key: String,
    value: String,
    public: bool,
}

impl From<&Variable> for VariableInfo {
    fn from(variable: &Variable) -> Self {
        let value = if variable.public {
            variable.value.clone()
        } else {
            "[MASKED]".to_string()
        };
        Self {
            key: variable.key.clone(),
            value,
            public: variable.public,
        }
    }
}

impl fmt::Display for VariableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

pub async fn handle(command: JobCommand, ctx: &mut Context) -> Result<()> {
    match command {
        JobCommand::Run { id, runner } => {
            let event = BuildEvent::Run {
                runner_id: runner.map(RunnerId),
            };
            transition(ctx, BuildId(id), event).await
        }
        JobCommand::Succeed { id } => transition(ctx, BuildId(id), BuildEvent::Succeed).await,
        JobCommand::Fail { id } => transition(ctx, BuildId(id), BuildEvent::Drop).await,
        JobCommand::Cancel { id } => transition(ctx, BuildId(id), BuildEvent::Cancel).await,
        JobCommand::Skip { id } => transition(ctx, BuildId(id), BuildEvent::Skip).await,
        JobCommand::Retry { id } => {
            let (retry, effects) = ctx.store.retry(BuildId(id))?;
            ctx.execute(effects).await?;
            output::print_either(
                format!("Retried build {} as {}", id, retry.id),
                &BuildInfo::new(&retry),
                ctx.format,
            )
        }
        JobCommand::Show { id } => {
            let build = ctx.store.build(BuildId(id))?;
            let snapshot = ctx.store.snapshot(build.pipeline_id)?;
            let retried = snapshot.view().retried().iter().any(|b| b.id == build.id);
            output::print(&BuildInfo::new(build).retried(retried), ctx.format)?;
            Ok(())
        }
        JobCommand::Deps { id } => {
            let build = ctx.store.build(BuildId(id))?.clone();
            let snapshot = ctx.store.snapshot(build.pipeline_id)?;
            let deps: Vec<BuildInfo> = snapshot
                .view()
                .depends_on(&build)
                .into_iter()
                .map(BuildInfo::new)
                .collect();
            output::print_list(&deps, ctx.format, "No dependencies")?;
            Ok(())
        }
        JobCommand::Variables { id } => {
            let build = ctx.store.build(BuildId(id))?.clone();
            let project = ctx.store.project(build.project_id)?.clone();
            let pipeline = ctx.store.pipeline(build.pipeline_id)?.clone();
            let secrets = ctx.secrets.secret_variables(project.id).await?;

            let list = cg_core::variables(
                &build,
                &project,
                &pipeline,
                &secrets,
                ctx.store.config(),
            );
            let variables: Vec<VariableInfo> = list.iter().map(VariableInfo::from).collect();
            output::print_list(&variables, ctx.format, "No variables")?;
            Ok(())
        }
        JobCommand::Trace { id, output: text } => {
            let build = ctx.store.append_trace(BuildId(id), &text)?;
            let len = build.trace.as_ref().map_or(0, String::len);
            output::print(
                &Message::new(format!("Build {} trace is {} bytes", build.id, len)),
                ctx.format,
            )?;
            Ok(())
        }
    }
}

async fn transition(ctx: &mut Context, id: BuildId, event: BuildEvent) -> Result<()> {
    let from = ctx.store.build(id)?.status;
    let (build, effects) = ctx.store.transition(id, event)?;
    ctx.execute(effects).await?;

    output::print_either(
        format!("Build {} {}: {} -> {}", build.id, build.name, from, build.status),
        &BuildInfo::new(&build),
        ctx.format,
    )
}
