// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: secret variables and artifact blobs

pub mod artifacts;
pub mod executor;
pub mod secrets;
pub mod traced;

pub use artifacts::{ArtifactError, ArtifactStore, FsArtifactStore};
pub use executor::EffectExecutor;
pub use secrets::{FileSecretStore, SecretError, SecretStore};
pub use traced::{TracedArtifactStore, TracedSecretStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use artifacts::{ArtifactCall, FakeArtifactStore};
#[cfg(any(test, feature = "test-support"))]
pub use secrets::FakeSecretStore;
