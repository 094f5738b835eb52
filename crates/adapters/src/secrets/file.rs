// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML-file secret store
//!
//! ```toml
//! [projects.1]
//! DEPLOY_TOKEN = "s3cr3t"
//! ```

use super::{SecretError, SecretStore};
use async_trait::async_trait;
use cg_core::{ProjectId, Variable};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(default)]
    projects: BTreeMap<String, BTreeMap<String, String>>,
}

/// Reads per-project secrets from a TOML file on every lookup.
/// A missing file means no secrets.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn load(&self) -> Result<SecretsFile, SecretError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SecretsFile::default())
            }
            Err(source) => {
                return Err(SecretError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        toml::from_str(&content).map_err(|source| SecretError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn secret_variables(&self, project_id: ProjectId) -> Result<Vec<Variable>, SecretError> {
        let mut file = self.load().await?;
        let secrets = file
            .projects
            .remove(&project_id.to_string())
            .unwrap_or_default();
        Ok(secrets
            .into_iter()
            .map(|(key, value)| Variable::secret(key, value))
            .collect())
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
