// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem artifact store

use super::{ArtifactError, ArtifactStore};
use async_trait::async_trait;
use cg_core::BuildId;
use std::path::{Component, Path, PathBuf};

/// Artifact blobs stored as files under a root directory.
///
/// Archive and metadata paths are relative to the root. Traces live at
/// `traces/<build_id>.log`.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn trace_path(&self, build_id: BuildId) -> PathBuf {
        self.root.join("traces").join(format!("{build_id}.log"))
    }

    /// Resolve a blob path, refusing anything that escapes the root
    fn resolve(&self, path: &str) -> Result<PathBuf, ArtifactError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(ArtifactError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

async fn remove_if_present(path: &Path) -> Result<bool, ArtifactError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn delete_archive(&self, build_id: BuildId, path: &str) -> Result<(), ArtifactError> {
        let removed = remove_if_present(&self.resolve(path)?).await?;
        tracing::debug!(%build_id, path, removed, "archive deleted");
        Ok(())
    }

    async fn delete_metadata(&self, build_id: BuildId, path: &str) -> Result<(), ArtifactError> {
        let removed = remove_if_present(&self.resolve(path)?).await?;
        tracing::debug!(%build_id, path, removed, "metadata deleted");
        Ok(())
    }

    async fn erase_trace(&self, build_id: BuildId) -> Result<(), ArtifactError> {
        let removed = remove_if_present(&self.trace_path(build_id)).await?;
        tracing::debug!(%build_id, removed, "trace erased");
        Ok(())
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
