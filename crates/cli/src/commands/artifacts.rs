// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact commands

use super::{Context, Message};
use crate::output;
use anyhow::Result;
use cg_core::{ArtifactFile, Build, BuildId, EraseOutcome, UserId};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct ArtifactsArgs {
    #[command(subcommand)]
    pub command: ArtifactsCommand,
}

#[derive(Subcommand)]
pub enum ArtifactsCommand {
    /// Record an uploaded archive for a build
    Attach {
        /// Build id
        id: u64,
        /// Archive path, relative to the artifact root
        path: String,
        /// Archive size in bytes
        #[arg(long, default_value = "0")]
        size: u64,
        /// Metadata path, relative to the artifact root
        #[arg(long)]
        metadata: Option<String>,
        /// Metadata size in bytes
        #[arg(long, default_value = "0")]
        metadata_size: u64,
    },
    /// Set artifact expiry relative to now ("never" clears it)
    Expire {
        /// Build id
        id: u64,
        /// Duration such as "1 week" or "3600"
        value: String,
    },
    /// Keep a build's artifacts forever
    Keep { id: u64 },
    /// Erase a build's artifacts and trace
    Erase {
        /// Build id
        id: u64,
        /// User performing the erase; omitted means the system
        #[arg(long)]
        user: Option<u64>,
    },
    /// Delete every expired archive
    Cleanup,
}

#[derive(Serialize)]
struct ArtifactsInfo {
    build_id: u64,
    archive: Option<String>,
    size: Option<u64>,
    metadata: Option<String>,
    expire_at: Option<String>,
}

impl ArtifactsInfo {
    fn new(build: &Build) -> Self {
        Self {
            build_id: build.id.0,
            archive: build.artifacts.archive.as_ref().map(|a| a.path.clone()),
            size: build.artifacts.archive.as_ref().map(|a| a.size),
            metadata: build.artifacts.metadata.as_ref().map(|m| m.path.clone()),
            expire_at: build.artifacts.expire_at.map(|t| t.to_rfc3339()),
        }
    }
}

impl fmt::Display for ArtifactsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Build {} artifacts: {} (expires {})",
            self.build_id,
            self.archive.as_deref().unwrap_or("none"),
            self.expire_at.as_deref().unwrap_or("never")
        )
    }
}

pub async fn handle(command: ArtifactsCommand, ctx: &mut Context) -> Result<()> {
    match command {
        ArtifactsCommand::Attach {
            id,
            path,
            size,
            metadata,
            metadata_size,
        } => {
            let metadata = metadata.map(|path| ArtifactFile::new(path, metadata_size));
            let build =
                ctx.store
                    .attach_artifacts(BuildId(id), ArtifactFile::new(path, size), metadata)?;
            output::print(&ArtifactsInfo::new(&build), ctx.format)?;
        }
        ArtifactsCommand::Expire { id, value } => {
            let build = ctx.store.set_expire_in(BuildId(id), Some(&value))?;
            output::print(&ArtifactsInfo::new(&build), ctx.format)?;
        }
        ArtifactsCommand::Keep { id } => {
            let build = ctx.store.keep_artifacts(BuildId(id))?;
            output::print(&ArtifactsInfo::new(&build), ctx.format)?;
        }
        ArtifactsCommand::Erase { id, user } => {
            let message = match ctx.store.erase(BuildId(id), user.map(UserId))? {
                EraseOutcome::Erased(effects) => {
                    ctx.execute(effects).await?;
                    format!("Erased build {id}")
                }
                EraseOutcome::NotErasable => format!("Build {id} has nothing to erase"),
            };
            output::print(&Message::new(message), ctx.format)?;
        }
        ArtifactsCommand::Cleanup => {
            let effects = ctx.store.remove_expired_artifacts()?;
            let events = ctx.execute(effects).await?;
            output::print(
                &Message::new(format!("Removed expired artifacts of {} builds", events.len())),
                ctx.format,
            )?;
        }
    }
    Ok(())
}
