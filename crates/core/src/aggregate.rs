// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status aggregation for stages and pipelines
//!
//! All functions here are pure reductions over a fixed snapshot; calling
//! them twice on the same rows gives the same answer.

use crate::graph;
use crate::id::PipelineId;
use crate::stage;
use crate::status::{Status, StatusView};
use std::collections::HashMap;
use std::sync::Mutex;

/// Drop skipped rows and ignored failures; keep everything else
pub fn exclude_ignored<'a, T, I>(builds: I) -> Vec<&'a T>
where
    T: StatusView + 'a,
    I: IntoIterator<Item = &'a T>,
{
    builds
        .into_iter()
        .filter(|b| b.status() != Status::Skipped && !b.is_ignored())
        .collect()
}

/// Status of one stage, computed from the latest attempts of its builds
pub fn stage_status<T: StatusView>(builds: &[T], stage: &str) -> Status {
    let current = graph::latest(builds)
        .into_iter()
        .filter(|b| b.stage() == stage);
    Status::fold(exclude_ignored(current).into_iter().map(|b| b.status()))
}

/// Status of a pipeline: the fold of every stage's status
pub fn pipeline_status<T: StatusView>(builds: &[T]) -> Status {
    Status::fold(
        stage::stages(builds)
            .iter()
            .map(|stage| stage_status(builds, stage.name)),
    )
}

#[derive(Debug, Clone, Copy)]
struct CachedStatus {
    version: u64,
    status: Status,
}

/// Read-through cache of pipeline status keyed by snapshot version.
///
/// A lookup with a version other than the cached one recomputes. Writers
/// call [`StatusCache::invalidate`] whenever a pipeline's builds change.
#[derive(Debug, Default)]
pub struct StatusCache {
    entries: Mutex<HashMap<PipelineId, CachedStatus>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<F>(&self, pipeline_id: PipelineId, version: u64, compute: F) -> Status
    where
        F: FnOnce() -> Status,
    {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = entries.get(&pipeline_id) {
            if cached.version == version {
                return cached.status;
            }
        }
        let status = compute();
        tracing::trace!(%pipeline_id, version, %status, "pipeline status computed");
        entries.insert(pipeline_id, CachedStatus { version, status });
        status
    }

    /// Cached value for exactly this version, if present
    pub fn peek(&self, pipeline_id: PipelineId, version: u64) -> Option<Status> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&pipeline_id)
            .filter(|cached| cached.version == version)
            .map(|cached| cached.status)
    }

    pub fn invalidate(&self, pipeline_id: PipelineId) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(&pipeline_id);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
