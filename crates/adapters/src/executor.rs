// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::artifacts::{ArtifactError, ArtifactStore};
use cg_core::{Effect, Event};
use tracing::Instrument;

/// Runs the blob side effects requested by build operations.
///
/// `Emit` effects carry no I/O; their events are handed back to the caller.
#[derive(Clone)]
pub struct EffectExecutor<A> {
    artifacts: A,
}

impl<A: ArtifactStore> EffectExecutor<A> {
    pub fn new(artifacts: A) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &A {
        &self.artifacts
    }

    /// Execute a single effect with tracing
    pub async fn execute(&self, effect: Effect) -> Result<Option<Event>, ArtifactError> {
        let span = tracing::info_span!(
            "effect",
            effect = effect.name(),
            build_id = effect.build_id().map(|id| id.0)
        );

        let start = std::time::Instant::now();
        let result = self.execute_inner(effect).instrument(span.clone()).await;
        let elapsed = start.elapsed();

        span.in_scope(|| match &result {
            Ok(event) => tracing::debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                has_event = event.is_some(),
                "completed"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "failed"
            ),
        });

        result
    }

    async fn execute_inner(&self, effect: Effect) -> Result<Option<Event>, ArtifactError> {
        match effect {
            Effect::Emit(event) => {
                tracing::info!(event = %event.name(), "event");
                Ok(Some(event))
            }
            Effect::DeleteArtifactArchive { build_id, path } => {
                self.artifacts.delete_archive(build_id, &path).await?;
                Ok(None)
            }
            Effect::DeleteArtifactMetadata { build_id, path } => {
                self.artifacts.delete_metadata(build_id, &path).await?;
                Ok(None)
            }
            Effect::EraseTrace { build_id } => {
                self.artifacts.erase_trace(build_id).await?;
                Ok(None)
            }
        }
    }

    /// Execute effects in order, stopping at the first failure.
    /// Returns the emitted events.
    pub async fn execute_all(
        &self,
        effects: impl IntoIterator<Item = Effect>,
    ) -> Result<Vec<Event>, ArtifactError> {
        let mut events = Vec::new();
        for effect in effects {
            if let Some(event) = self.execute(effect).await? {
                events.push(event);
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
