// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project record

use crate::config::Config;
use crate::id::ProjectId;
use crate::variables::{slugify, VariableList};
use serde::{Deserialize, Serialize};

/// A project owning pipelines and, optionally, dedicated runners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Full path, e.g. `group/name`
    pub path: String,
    #[serde(default = "default_shared_runners")]
    pub shared_runners_enabled: bool,
}

fn default_shared_runners() -> bool {
    true
}

impl Project {
    pub fn new(id: impl Into<ProjectId>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            shared_runners_enabled: true,
        }
    }

    pub fn with_shared_runners(self, enabled: bool) -> Self {
        Self {
            shared_runners_enabled: enabled,
            ..self
        }
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Everything before the last path segment
    pub fn namespace(&self) -> &str {
        self.path
            .rsplit_once('/')
            .map(|(namespace, _)| namespace)
            .unwrap_or("")
    }

    pub fn predefined_variables(&self, config: &Config) -> VariableList {
        let mut variables = VariableList::new();
        variables.append("CI_PROJECT_ID", self.id.to_string());
        variables.append("CI_PROJECT_NAME", self.name());
        variables.append("CI_PROJECT_NAMESPACE", self.namespace());
        variables.append("CI_PROJECT_PATH", &self.path);
        variables.append("CI_PROJECT_PATH_SLUG", slugify(&self.path));
        variables.append(
            "CI_PROJECT_URL",
            format!("{}/{}", config.server_url.trim_end_matches('/'), self.path),
        );
        variables
    }
}
