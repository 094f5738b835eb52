// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue commands

use super::{BuildInfo, Context};
use crate::output;
use anyhow::Result;
use cg_core::{BuildEvent, RunnerId};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommand,
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// List builds ready for dispatch
    Ready,
    /// Show the next build a runner would pick
    Next {
        /// Runner id
        #[arg(long)]
        runner: u64,
        /// Start the build on the runner instead of only showing it
        #[arg(long)]
        start: bool,
    },
    /// List pending builds that no online runner can pick
    Stuck,
}

pub async fn handle(command: QueueCommand, ctx: &mut Context) -> Result<()> {
    match command {
        QueueCommand::Ready => {
            let ready: Vec<BuildInfo> = ctx.store.ready_builds().iter().map(BuildInfo::new).collect();
            output::print_list(&ready, ctx.format, "No builds ready")?;
        }
        QueueCommand::Next { runner, start } => {
            let runner_id = RunnerId(runner);
            let next = ctx.store.next_for_runner(runner_id)?;
            let build = match next {
                Some(build) if start => {
                    ctx.store.contact_runner(runner_id)?;
                    let (started, effects) = ctx.store.transition(
                        build.id,
                        BuildEvent::Run {
                            runner_id: Some(runner_id),
                        },
                    )?;
                    ctx.execute(effects).await?;
                    Some(started)
                }
                other => other,
            };
            match build {
                Some(build) => output::print(&BuildInfo::new(&build), ctx.format)?,
                None => output::print_either(
                    format!("No builds ready for runner {runner}"),
                    &serde_json::Value::Null,
                    ctx.format,
                )?,
            }
        }
        QueueCommand::Stuck => {
            let stuck: Vec<BuildInfo> = ctx.store.stuck_builds().iter().map(BuildInfo::new).collect();
            output::print_list(&stuck, ctx.format, "No stuck builds")?;
        }
    }
    Ok(())
}
