// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake secret store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SecretError, SecretStore};
use async_trait::async_trait;
use cg_core::{ProjectId, Variable};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory secret store that records every lookup
#[derive(Clone, Default)]
pub struct FakeSecretStore {
    secrets: Arc<Mutex<HashMap<ProjectId, Vec<Variable>>>>,
    lookups: Arc<Mutex<Vec<ProjectId>>>,
    unavailable: Arc<Mutex<bool>>,
}

impl FakeSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret for a project; later inserts come later in the list
    pub fn insert(&self, project_id: ProjectId, key: &str, value: &str) {
        self.secrets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(project_id)
            .or_default()
            .push(Variable::secret(key, value));
    }

    /// Make every subsequent lookup fail
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap_or_else(|e| e.into_inner()) = unavailable;
    }

    /// Projects looked up so far, in call order
    pub fn lookups(&self) -> Vec<ProjectId> {
        self.lookups.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn secret_variables(&self, project_id: ProjectId) -> Result<Vec<Variable>, SecretError> {
        self.lookups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(project_id);

        if *self.unavailable.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(SecretError::Unavailable("fake store offline".to_string()));
        }

        Ok(self
            .secrets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
