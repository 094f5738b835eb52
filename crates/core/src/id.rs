// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row identifiers and ID generation

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                $name(n)
            }
        }
    };
}

row_id!(
    /// Build row identifier. Monotonic: a larger id is a later attempt.
    BuildId
);
row_id!(
    /// Pipeline identifier
    PipelineId
);
row_id!(
    /// Project identifier
    ProjectId
);
row_id!(
    /// Runner identifier
    RunnerId
);
row_id!(
    /// Actor that performed a user-initiated operation
    UserId
);

/// Generates monotonic row identifiers
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> u64;
}

/// Sequential ID generator shared between clones
#[derive(Clone)]
pub struct SequentialIdGen {
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a generator whose first id is `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(first)),
        }
    }

    /// Ensure the next id is strictly greater than `seen`
    pub fn observe(&self, seen: u64) {
        self.counter.fetch_max(seen.saturating_add(1), Ordering::SeqCst);
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}
