// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact blob adapters

mod fs;

pub use fs::FsArtifactStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ArtifactCall, FakeArtifactStore};

use async_trait::async_trait;
use cg_core::BuildId;
use thiserror::Error;

/// Errors from artifact blob operations
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("invalid artifact path: {0}")]
    InvalidPath(String),
    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage for artifact archives, metadata and build traces.
///
/// Deleting something that is already gone succeeds.
#[async_trait]
pub trait ArtifactStore: Clone + Send + Sync + 'static {
    async fn delete_archive(&self, build_id: BuildId, path: &str) -> Result<(), ArtifactError>;

    async fn delete_metadata(&self, build_id: BuildId, path: &str) -> Result<(), ArtifactError>;

    async fn erase_trace(&self, build_id: BuildId) -> Result<(), ArtifactError>;
}
