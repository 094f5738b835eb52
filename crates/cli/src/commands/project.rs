// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project commands

use super::{Context, Message};
use crate::output;
use anyhow::Result;
use cg_core::Project;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommand,
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Register or update a project
    Add {
        /// Project id
        id: u64,
        /// Full path, e.g. group/name
        path: String,
        /// Refuse shared runners for this project
        #[arg(long)]
        no_shared_runners: bool,
    },
    /// List projects
    List,
}

#[derive(Serialize)]
struct ProjectInfo {
    id: u64,
    path: String,
    shared_runners_enabled: bool,
}

impl fmt::Display for ProjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<6} {}", self.id, self.path)?;
        if !self.shared_runners_enabled {
            write!(f, " (no shared runners)")?;
        }
        Ok(())
    }
}

pub fn handle(command: ProjectCommand, ctx: &mut Context) -> Result<()> {
    match command {
        ProjectCommand::Add {
            id,
            path,
            no_shared_runners,
        } => {
            let project = Project::new(id, path).with_shared_runners(!no_shared_runners);
            ctx.store.upsert_project(project.clone())?;
            output::print(
                &Message::new(format!("Added project {} {}", project.id, project.path)),
                ctx.format,
            )?;
        }
        ProjectCommand::List => {
            let projects: Vec<ProjectInfo> = ctx
                .store
                .state()
                .projects
                .values()
                .map(|p| ProjectInfo {
                    id: p.id.0,
                    path: p.path.clone(),
                    shared_runners_enabled: p.shared_runners_enabled,
                })
                .collect();
            output::print_list(&projects, ctx.format, "No projects")?;
        }
    }
    Ok(())
}
