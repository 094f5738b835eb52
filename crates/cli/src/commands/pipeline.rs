// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline commands

use super::{BuildInfo, Context, Message};
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use cg_core::{PipelineId, ProjectId, Status};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct PipelineArgs {
    #[command(subcommand)]
    pub command: PipelineCommand,
}

#[derive(Subcommand)]
pub enum PipelineCommand {
    /// Create a pipeline from a plan file and seed its builds
    Create {
        /// Plan file (TOML)
        plan: PathBuf,
        /// Owning project id
        #[arg(long)]
        project: u64,
        /// Branch or tag name
        #[arg(long = "ref", default_value = "main")]
        git_ref: String,
        /// Commit sha
        #[arg(long)]
        sha: String,
        /// The ref is a tag
        #[arg(long)]
        tag: bool,
    },
    /// Print the aggregated status of a pipeline or one of its stages
    Status {
        /// Pipeline id
        id: u64,
        /// Report this stage instead of the whole pipeline
        #[arg(long)]
        stage: Option<String>,
    },
    /// Show stages and builds of a pipeline
    Show {
        /// Pipeline id
        id: u64,
    },
    /// Cancel every pending or running build of a pipeline
    Cancel {
        /// Pipeline id
        id: u64,
    },
    /// Retry every failed or canceled build of a pipeline
    Retry {
        /// Pipeline id
        id: u64,
    },
    /// List pipelines
    List,
}

#[derive(Serialize)]
struct StatusInfo {
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    status: Status,
}

impl fmt::Display for StatusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)
    }
}

#[derive(Serialize)]
struct PipelineInfo {
    id: u64,
    project_id: u64,
    git_ref: String,
    sha: String,
    tag: bool,
    status: Status,
}

impl fmt::Display for PipelineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6} project={:<4} {:<20} {}",
            self.id, self.project_id, self.git_ref, self.status
        )
    }
}

#[derive(Serialize)]
struct StageInfo {
    name: String,
    idx: u32,
    status: Status,
    builds: Vec<BuildInfo>,
}

#[derive(Serialize)]
struct PipelineDetail {
    #[serde(flatten)]
    pipeline: PipelineInfo,
    stages: Vec<StageInfo>,
    retried: Vec<BuildInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    queued_secs: Option<u64>,
}

impl fmt::Display for PipelineDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.pipeline;
        writeln!(f, "Pipeline: {}", p.id)?;
        writeln!(f, "  Project: {}", p.project_id)?;
        let kind = if p.tag { "tag" } else { "branch" };
        writeln!(f, "  Ref: {} ({}) {}", p.git_ref, kind, p.sha)?;
        write!(f, "  Status: {}", p.status)?;
        if let Some(secs) = self.duration_secs {
            write!(f, "\n  Duration: {}s", secs)?;
        }
        if let Some(secs) = self.queued_secs {
            write!(f, "\n  Queued: {}s", secs)?;
        }
        for stage in &self.stages {
            write!(f, "\n  Stage {} ({}): {}", stage.idx, stage.name, stage.status)?;
            for build in &stage.builds {
                write!(f, "\n    {}", build)?;
            }
        }
        if !self.retried.is_empty() {
            write!(f, "\n  Retried:")?;
            for build in &self.retried {
                write!(f, "\n    {}", build)?;
            }
        }
        Ok(())
    }
}

pub async fn handle(command: PipelineCommand, ctx: &mut Context) -> Result<()> {
    match command {
        PipelineCommand::Create {
            plan,
            project,
            git_ref,
            sha,
            tag,
        } => create(ctx, plan, ProjectId(project), &git_ref, &sha, tag),
        PipelineCommand::Status { id, stage } => {
            let id = PipelineId(id);
            let status = match &stage {
                Some(name) => {
                    let snapshot = ctx.store.snapshot(id)?;
                    let view = snapshot.view();
                    if !view.builds().iter().any(|b| &b.stage == name) {
                        bail!("pipeline {id} has no stage named {name}");
                    }
                    view.stage_status(name)
                }
                None => ctx.store.pipeline_status(id)?,
            };
            output::print(
                &StatusInfo {
                    id: id.0,
                    stage,
                    status,
                },
                ctx.format,
            )?;
            Ok(())
        }
        PipelineCommand::Show { id } => show(ctx, PipelineId(id)),
        PipelineCommand::Cancel { id } => {
            let (canceled, effects) = ctx.store.cancel_running(PipelineId(id))?;
            ctx.execute(effects).await?;
            let builds: Vec<BuildInfo> = canceled.iter().map(BuildInfo::new).collect();
            output::print_either(
                format!("Canceled {} builds in pipeline {}", builds.len(), id),
                &builds,
                ctx.format,
            )
        }
        PipelineCommand::Retry { id } => {
            let (retries, effects) = ctx.store.retry_failed(PipelineId(id))?;
            ctx.execute(effects).await?;
            let builds: Vec<BuildInfo> = retries.iter().map(BuildInfo::new).collect();
            output::print_either(
                format!("Retried {} builds in pipeline {}", builds.len(), id),
                &builds,
                ctx.format,
            )
        }
        PipelineCommand::List => {
            let ids: Vec<PipelineId> = ctx.store.pipelines().map(|p| p.id).collect();
            let mut pipelines = Vec::with_capacity(ids.len());
            for id in ids {
                pipelines.push(pipeline_info(ctx, id)?);
            }
            output::print_list(&pipelines, ctx.format, "No pipelines")?;
            Ok(())
        }
    }
}

fn create(
    ctx: &mut Context,
    plan_path: PathBuf,
    project: ProjectId,
    git_ref: &str,
    sha: &str,
    tag: bool,
) -> Result<()> {
    let plan = cg_plan::load_plan(&plan_path)?;
    if plan.jobs.is_empty() {
        bail!("plan {} defines no jobs", plan_path.display());
    }
    cg_plan::validate_stage_order(&plan.jobs)?;

    let pipeline = ctx.store.create_pipeline(project, git_ref, sha, tag)?;
    let builds = cg_plan::seed(
        &plan.jobs,
        &pipeline,
        ctx.store.id_gen(),
        ctx.store.clock(),
        ctx.store.config(),
    )?;
    let count = builds.len();
    ctx.store.insert_builds(builds)?;
    tracing::info!(pipeline = %pipeline.id, builds = count, "pipeline created");

    match ctx.format {
        OutputFormat::Text => output::print(
            &Message::new(format!("Created pipeline {} ({} builds)", pipeline.id, count)),
            ctx.format,
        ),
        OutputFormat::Json => show(ctx, pipeline.id),
    }
}

fn pipeline_info(ctx: &Context, id: PipelineId) -> Result<PipelineInfo> {
    let pipeline = ctx.store.pipeline(id)?;
    Ok(PipelineInfo {
        id: pipeline.id.0,
        project_id: pipeline.project_id.0,
        git_ref: pipeline.git_ref.clone(),
        sha: pipeline.sha.clone(),
        tag: pipeline.tag,
        status: ctx.store.pipeline_status(id)?,
    })
}

fn show(ctx: &Context, id: PipelineId) -> Result<()> {
    let info = pipeline_info(ctx, id)?;
    let snapshot = ctx.store.snapshot(id)?;
    let view = snapshot.view();

    let stages = view
        .stages()
        .iter()
        .map(|stage| StageInfo {
            name: stage.name.to_string(),
            idx: stage.idx,
            status: view.stage_status(stage.name),
            builds: stage.latest().into_iter().map(|b| BuildInfo::new(b)).collect(),
        })
        .collect();
    let retried = view
        .retried()
        .into_iter()
        .map(|b| BuildInfo::new(b).retried(true))
        .collect();

    output::print(
        &PipelineDetail {
            pipeline: info,
            stages,
            retried,
            duration_secs: view.duration().map(|d| d.as_secs()),
            queued_secs: view.queued_duration().map(|d| d.as_secs()),
        },
        ctx.format,
    )?;
    Ok(())
}
