// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution variables and their ordered assembly
//!
//! The final list handed to a runner is the concatenation of five groups in
//! a fixed order. Nothing here deduplicates: consumers apply the list in
//! order, so a later entry with the same key wins.

use crate::build::Build;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::project::Project;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single key/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
    /// Public values may be displayed; secrets are masked
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            public: true,
        }
    }

    pub fn secret(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            public: false,
            ..Self::new(key, value)
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.public {
            write!(f, "{}={}", self.key, self.value)
        } else {
            write!(f, "{}=[MASKED]", self.key)
        }
    }
}

/// Ordered list of variables, duplicates allowed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableList(Vec<Variable>);

impl VariableList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(Variable::new(key, value));
    }

    pub fn concat(&mut self, other: impl IntoIterator<Item = Variable>) {
        self.0.extend(other);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.key.as_str()).collect()
    }

    /// Last value for `key`, which is what a consumer would observe
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|v| v.key == key)
            .map(|v| v.value.as_str())
    }

    /// Collapse to an environment map with last-write-wins semantics
    pub fn to_env(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|v| (v.key.clone(), v.value.clone()))
            .collect()
    }

    pub fn into_vec(self) -> Vec<Variable> {
        self.0
    }
}

impl FromIterator<Variable> for VariableList {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for VariableList {
    type Item = Variable;
    type IntoIter = std::vec::IntoIter<Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VariableList {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The five variable groups, kept apart until the final concatenation
#[derive(Debug, Clone, Default)]
pub struct VariableGroups {
    pub system: VariableList,
    pub project: VariableList,
    pub pipeline: VariableList,
    pub declared: VariableList,
    pub secret: VariableList,
}

impl VariableGroups {
    /// Gather every group for `build`. `secrets` come from the secret store.
    pub fn for_build(
        build: &Build,
        project: &Project,
        pipeline: &Pipeline,
        secrets: &[Variable],
        config: &Config,
    ) -> Self {
        Self {
            system: build.predefined_variables(config),
            project: project.predefined_variables(config),
            pipeline: pipeline.predefined_variables(),
            declared: build.variables.iter().cloned().collect(),
            secret: secrets
                .iter()
                .map(|v| Variable {
                    public: false,
                    ..v.clone()
                })
                .collect(),
        }
    }

    /// Concatenate in contract order: system, project, pipeline, declared, secret
    pub fn into_list(self) -> VariableList {
        let mut list = self.system;
        list.concat(self.project);
        list.concat(self.pipeline);
        list.concat(self.declared);
        list.concat(self.secret);
        list
    }
}

/// Final variable sequence for `build`
pub fn variables(
    build: &Build,
    project: &Project,
    pipeline: &Pipeline,
    secrets: &[Variable],
    config: &Config,
) -> VariableList {
    VariableGroups::for_build(build, project, pipeline, secrets, config).into_list()
}

/// Lowercase, replace anything outside `[a-z0-9]` with `-`, trim dashes, cap at 63 chars
pub(crate) fn slugify(value: &str) -> String {
    let mapped: String = value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .take(63)
        .collect();
    mapped.trim_matches('-').to_string()
}

#[cfg(test)]
#[path = "variables_tests.rs"]
mod tests;
