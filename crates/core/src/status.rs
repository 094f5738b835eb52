// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build status and the precedence used to fold statuses together

use crate::error::ValidationError;
use crate::id::BuildId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status of a single build row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    /// Never ran because its `when` condition did not hold
    Skipped,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Pending,
        Status::Running,
        Status::Success,
        Status::Failed,
        Status::Canceled,
        Status::Skipped,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Success => "success",
            Status::Failed => "failed",
            Status::Canceled => "canceled",
            Status::Skipped => "skipped",
        }
    }

    /// Pending or running
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Pending | Status::Running)
    }

    /// Reached a terminal status
    pub fn is_complete(&self) -> bool {
        !self.is_active()
    }

    /// Rank used when folding: failed > running > pending > canceled > success > skipped
    fn precedence(&self) -> u8 {
        match self {
            Status::Failed => 5,
            Status::Running => 4,
            Status::Pending => 3,
            Status::Canceled => 2,
            Status::Success => 1,
            Status::Skipped => 0,
        }
    }

    /// Reduce a set of statuses to the one with highest precedence.
    ///
    /// An empty set folds to `Success`.
    pub fn fold<I>(statuses: I) -> Status
    where
        I: IntoIterator<Item = Status>,
    {
        statuses
            .into_iter()
            .max_by_key(Status::precedence)
            .unwrap_or(Status::Success)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.name() == s)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// The minimal capability set the aggregator and resolver need from a row.
///
/// Builds, bridges and external statuses all expose this, so derived views
/// never branch on the concrete kind.
pub trait StatusView {
    fn id(&self) -> BuildId;
    fn name(&self) -> &str;
    fn git_ref(&self) -> &str;
    fn stage(&self) -> &str;
    fn stage_idx(&self) -> u32;
    fn status(&self) -> Status;
    fn allow_failure(&self) -> bool;

    /// A failure that does not count against the stage
    fn is_ignored(&self) -> bool {
        self.allow_failure() && self.status() == Status::Failed
    }
}

impl<T: StatusView + ?Sized> StatusView for &T {
    fn id(&self) -> BuildId {
        (**self).id()
    }
    fn name(&self) -> &str {
        (**self).name()
    }
    fn git_ref(&self) -> &str {
        (**self).git_ref()
    }
    fn stage(&self) -> &str {
        (**self).stage()
    }
    fn stage_idx(&self) -> u32 {
        (**self).stage_idx()
    }
    fn status(&self) -> Status {
        (**self).status()
    }
    fn allow_failure(&self) -> bool {
        (**self).allow_failure()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
