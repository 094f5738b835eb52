// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake artifact store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ArtifactError, ArtifactStore};
use async_trait::async_trait;
use cg_core::BuildId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Recorded artifact call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactCall {
    DeleteArchive { build_id: BuildId, path: String },
    DeleteMetadata { build_id: BuildId, path: String },
    EraseTrace { build_id: BuildId },
}

/// In-memory artifact store that records calls
#[derive(Clone, Default)]
pub struct FakeArtifactStore {
    blobs: Arc<Mutex<HashSet<String>>>,
    traces: Arc<Mutex<HashSet<BuildId>>>,
    calls: Arc<Mutex<Vec<ArtifactCall>>>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl FakeArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored blob
    pub fn put_blob(&self, path: &str) {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string());
    }

    /// Seed a stored trace
    pub fn put_trace(&self, build_id: BuildId) {
        self.traces
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(build_id);
    }

    pub fn has_blob(&self, path: &str) -> bool {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(path)
    }

    pub fn has_trace(&self, build_id: BuildId) -> bool {
        self.traces
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&build_id)
    }

    /// Make every subsequent call fail with an io error
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.to_string());
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ArtifactCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: ArtifactCall) -> Result<(), ArtifactError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        match self
            .fail_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            Some(message) => Err(std::io::Error::other(message.clone()).into()),
            None => Ok(()),
        }
    }

    fn remove_blob(&self, path: &str) {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path);
    }
}

#[async_trait]
impl ArtifactStore for FakeArtifactStore {
    async fn delete_archive(&self, build_id: BuildId, path: &str) -> Result<(), ArtifactError> {
        self.record(ArtifactCall::DeleteArchive {
            build_id,
            path: path.to_string(),
        })?;
        self.remove_blob(path);
        Ok(())
    }

    async fn delete_metadata(&self, build_id: BuildId, path: &str) -> Result<(), ArtifactError> {
        self.record(ArtifactCall::DeleteMetadata {
            build_id,
            path: path.to_string(),
        })?;
        self.remove_blob(path);
        Ok(())
    }

    async fn erase_trace(&self, build_id: BuildId) -> Result<(), ArtifactError> {
        self.record(ArtifactCall::EraseTrace { build_id })?;
        self.traces
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&build_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
