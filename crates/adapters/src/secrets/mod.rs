// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret variable adapters

mod file;

pub use file::FileSecretStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSecretStore;

use async_trait::async_trait;
use cg_core::{ProjectId, Variable};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from secret lookups
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read secrets from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid secrets file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("secret store unavailable: {0}")]
    Unavailable(String),
}

/// Source of the secret variable group
#[async_trait]
pub trait SecretStore: Clone + Send + Sync + 'static {
    /// Secret variables for a project, in the order they are applied.
    /// Every returned variable is marked non-public.
    async fn secret_variables(&self, project_id: ProjectId) -> Result<Vec<Variable>, SecretError>;
}
