// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for unit tests

use crate::{Build, FakeClock, Pipeline, Project, Status};
use chrono::{DateTime, Utc};

/// Fixed instant so fixture rows compare equal on `created_at`
pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600, 0).unwrap()
}

pub fn project() -> Project {
    Project::new(1, "acme/widgets")
}

pub fn pipeline(clock: &FakeClock) -> Pipeline {
    Pipeline::new(1, 1, "main", "0123456789abcdef0123456789abcdef01234567", clock)
}

/// A build in pipeline 1 on `main`
pub fn build(id: u64, name: &str, stage: &str, stage_idx: u32, status: Status) -> Build {
    let clock = FakeClock::at(epoch());
    Build::new(id, &pipeline(&clock), name, stage, stage_idx, &clock).with_status(status)
}
