// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::artifacts::{ArtifactError, ArtifactStore};
use crate::secrets::{SecretError, SecretStore};
use async_trait::async_trait;
use cg_core::{BuildId, ProjectId, Variable};
use tracing::Instrument;

/// Wrapper that adds tracing to any SecretStore
#[derive(Clone)]
pub struct TracedSecretStore<S> {
    inner: S,
}

impl<S> TracedSecretStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: SecretStore> SecretStore for TracedSecretStore<S> {
    async fn secret_variables(&self, project_id: ProjectId) -> Result<Vec<Variable>, SecretError> {
        let span = tracing::info_span!("secrets.lookup", project_id = project_id.0);
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.secret_variables(project_id).await;
            let elapsed = start.elapsed();

            // Values never reach the log, only the count
            match &result {
                Ok(secrets) => tracing::info!(
                    count = secrets.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "secrets loaded"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "lookup failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any ArtifactStore
#[derive(Clone)]
pub struct TracedArtifactStore<A> {
    inner: A,
}

impl<A> TracedArtifactStore<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: ArtifactStore> ArtifactStore for TracedArtifactStore<A> {
    async fn delete_archive(&self, build_id: BuildId, path: &str) -> Result<(), ArtifactError> {
        let span = tracing::info_span!("artifacts.delete_archive", build_id = build_id.0, path);
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.delete_archive(build_id, path).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => {
                    tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "archive deleted")
                }
                Err(e) => {
                    tracing::error!(elapsed_ms = elapsed.as_millis() as u64, error = %e, "failed")
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn delete_metadata(&self, build_id: BuildId, path: &str) -> Result<(), ArtifactError> {
        let span = tracing::info_span!("artifacts.delete_metadata", build_id = build_id.0, path);
        let result = self.inner.delete_metadata(build_id, path).instrument(span.clone()).await;
        span.in_scope(|| match &result {
            Ok(()) => tracing::info!("metadata deleted"),
            Err(e) => tracing::error!(error = %e, "failed"),
        });

        result
    }

    async fn erase_trace(&self, build_id: BuildId) -> Result<(), ArtifactError> {
        let span = tracing::info_span!("artifacts.erase_trace", build_id = build_id.0);
        let result = self.inner.erase_trace(build_id).instrument(span.clone()).await;
        span.in_scope(|| match &result {
            Ok(()) => tracing::info!("trace erased"),
            Err(e) => tracing::error!(error = %e, "failed"),
        });

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
