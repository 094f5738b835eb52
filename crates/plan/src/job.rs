// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job definitions

use cg_core::{ValidationError, Variable, When};
use serde::{Deserialize, Serialize};

/// A job as declared in a plan, before any build row exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildDef {
    /// Job name
    pub name: String,
    /// Stage the job belongs to
    pub stage: String,
    /// Position of the stage in the plan's `stages` list
    pub stage_idx: u32,
    /// Capabilities a runner must offer
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub allow_failure: bool,
    #[serde(default)]
    pub when: When,
    /// Artifact retention, e.g. `"1 week"`
    #[serde(default)]
    pub expire_in: Option<String>,
    /// Declared variables in key order
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl BuildDef {
    pub fn new(name: impl Into<String>, stage: impl Into<String>, stage_idx: u32) -> Self {
        Self {
            name: name.into(),
            stage: stage.into(),
            stage_idx,
            tags: Vec::new(),
            allow_failure: false,
            when: When::OnSuccess,
            expire_in: None,
            variables: Vec::new(),
        }
    }
}

/// Check stage indexes of `defs` in the order given.
///
/// Indexes must never decrease, a stage name maps to a single index, and
/// two stages never share one.
pub fn validate_stage_order(defs: &[BuildDef]) -> Result<(), ValidationError> {
    cg_core::validate_stage_indices(defs.iter().map(|def| (def.stage.as_str(), def.stage_idx)))
}
