// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan TOML parsing

use crate::job::{validate_stage_order, BuildDef};
use cg_core::{parse_expire_in, ValidationError, Variable, When};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Stages used when a plan does not list its own
pub const DEFAULT_STAGES: [&str; 3] = ["build", "test", "deploy"];

/// Stage assigned to jobs that do not name one
pub const DEFAULT_STAGE: &str = "test";

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static VARIABLE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("constant regex pattern is valid")
});

/// Errors that can occur during plan parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("job {job:?} uses unknown stage {stage:?}")]
    UnknownStage { job: String, stage: String },
    #[error("job {job:?} declares invalid variable key {key:?}")]
    InvalidVariableKey { job: String, key: String },
    #[error("job {job:?}: {source}")]
    InvalidJob {
        job: String,
        #[source]
        source: ValidationError,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A parsed plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Stage names in execution order
    pub stages: Vec<String>,
    /// Jobs ordered by (stage_idx, name)
    pub jobs: Vec<BuildDef>,
}

impl Plan {
    pub fn get_job(&self, name: &str) -> Option<&BuildDef> {
        self.jobs.iter().find(|job| job.name == name)
    }

    /// Stage names that have at least one job
    pub fn used_stages(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|stage| self.jobs.iter().any(|job| &job.stage == *stage))
            .map(String::as_str)
            .collect()
    }
}

/// Parse a plan from a file on disk
pub fn load_plan(path: &Path) -> Result<Plan, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_plan(&content)
}

/// Parse a plan from TOML content
pub fn parse_plan(content: &str) -> Result<Plan, ParseError> {
    let raw: toml::Value = toml::from_str(content)?;
    let table = raw
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat("root must be a table".to_string()))?;

    let stages = parse_stages(table.get("stages"))?;

    let mut jobs = Vec::new();
    if let Some(value) = table.get("job") {
        let job_table = value
            .as_table()
            .ok_or_else(|| ParseError::InvalidFormat("job must be a table".to_string()))?;
        for (name, value) in job_table {
            jobs.push(parse_job(name, value, &stages)?);
        }
    }
    jobs.sort_by(|a, b| (a.stage_idx, &a.name).cmp(&(b.stage_idx, &b.name)));
    validate_stage_order(&jobs)?;

    tracing::debug!(stages = stages.len(), jobs = jobs.len(), "plan parsed");
    Ok(Plan { stages, jobs })
}

fn parse_stages(value: Option<&toml::Value>) -> Result<Vec<String>, ParseError> {
    let Some(value) = value else {
        return Ok(DEFAULT_STAGES.iter().map(|s| s.to_string()).collect());
    };
    let arr = value
        .as_array()
        .ok_or_else(|| ParseError::InvalidFormat("stages must be an array".to_string()))?;

    let mut stages: Vec<String> = Vec::with_capacity(arr.len());
    for item in arr {
        let name = item
            .as_str()
            .ok_or_else(|| ParseError::InvalidFormat("stages must be strings".to_string()))?;
        if stages.iter().any(|s| s == name) {
            return Err(ParseError::InvalidFormat(format!(
                "stage {:?} listed twice",
                name
            )));
        }
        stages.push(name.to_string());
    }
    Ok(stages)
}

fn parse_job(name: &str, value: &toml::Value, stages: &[String]) -> Result<BuildDef, ParseError> {
    let table = value
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat(format!("job.{} must be a table", name)))?;

    let stage = match table.get("stage") {
        Some(v) => v
            .as_str()
            .ok_or_else(|| ParseError::InvalidFormat(format!("job.{}.stage must be a string", name)))?,
        None => DEFAULT_STAGE,
    };
    let stage_idx = stages
        .iter()
        .position(|s| s == stage)
        .ok_or_else(|| ParseError::UnknownStage {
            job: name.to_string(),
            stage: stage.to_string(),
        })?;

    let tags = match table.get("tags") {
        Some(v) => parse_tags(name, v)?,
        None => Vec::new(),
    };

    let allow_failure = match table.get("allow_failure") {
        Some(v) => v.as_bool().ok_or_else(|| {
            ParseError::InvalidFormat(format!("job.{}.allow_failure must be a boolean", name))
        })?,
        None => false,
    };

    let when = match table.get("when") {
        Some(v) => v
            .as_str()
            .ok_or_else(|| ParseError::InvalidFormat(format!("job.{}.when must be a string", name)))?
            .parse::<When>()
            .map_err(|source| ParseError::InvalidJob {
                job: name.to_string(),
                source,
            })?,
        None => When::OnSuccess,
    };

    let expire_in = table
        .get("artifacts")
        .and_then(|v| v.as_table())
        .and_then(|t| t.get("expire_in"))
        .and_then(|v| v.as_str())
        .map(String::from);
    if let Some(expire_in) = &expire_in {
        parse_expire_in(expire_in).map_err(|source| ParseError::InvalidJob {
            job: name.to_string(),
            source,
        })?;
    }

    let variables = match table.get("variables") {
        Some(v) => parse_variables(name, v)?,
        None => Vec::new(),
    };

    Ok(BuildDef {
        name: name.to_string(),
        stage: stage.to_string(),
        stage_idx: stage_idx as u32,
        tags,
        allow_failure,
        when,
        expire_in,
        variables,
    })
}

fn parse_tags(job: &str, value: &toml::Value) -> Result<Vec<String>, ParseError> {
    let invalid =
        || ParseError::InvalidFormat(format!("job.{}.tags must be an array of strings", job));
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|tag| tag.as_str().map(String::from).ok_or_else(invalid))
        .collect()
}

fn parse_variables(job: &str, value: &toml::Value) -> Result<Vec<Variable>, ParseError> {
    let table = value.as_table().ok_or_else(|| {
        ParseError::InvalidFormat(format!("job.{}.variables must be a table", job))
    })?;

    let mut variables = Vec::with_capacity(table.len());
    for (key, value) in table {
        if !VARIABLE_KEY.is_match(key) {
            return Err(ParseError::InvalidVariableKey {
                job: job.to_string(),
                key: key.clone(),
            });
        }
        let value = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_) => {
                value.to_string()
            }
            _ => {
                return Err(ParseError::InvalidFormat(format!(
                    "job.{}.variables.{} must be a scalar",
                    job, key
                )))
            }
        };
        variables.push(Variable::new(key.clone(), value));
    }
    Ok(variables)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
