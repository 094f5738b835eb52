// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage grouping and ordering

use crate::error::ValidationError;
use crate::graph::LatestIndex;
use crate::status::StatusView;
use std::collections::BTreeMap;

/// A named phase of a pipeline and the rows assigned to it
#[derive(Debug)]
pub struct Stage<'a, T> {
    pub name: &'a str,
    /// Smallest stage index observed among the stage's builds
    pub idx: u32,
    /// Every row in the stage, retries included, ascending by id
    pub builds: Vec<&'a T>,
}

impl<T: StatusView> Stage<'_, T> {
    /// Latest attempts only
    pub fn latest(&self) -> Vec<&T> {
        let index = LatestIndex::new(&self.builds);
        self.builds
            .iter()
            .copied()
            .filter(|b| index.is_latest(*b))
            .collect()
    }
}

/// Group builds by stage name, ordered by each stage's minimum index.
///
/// Stages sharing a minimum index are ordered by name.
pub fn stages<T: StatusView>(builds: &[T]) -> Vec<Stage<'_, T>> {
    let mut grouped: BTreeMap<&str, Stage<'_, T>> = BTreeMap::new();
    for build in builds {
        let stage = grouped.entry(build.stage()).or_insert_with(|| Stage {
            name: build.stage(),
            idx: build.stage_idx(),
            builds: Vec::new(),
        });
        stage.idx = stage.idx.min(build.stage_idx());
        stage.builds.push(build);
    }

    let mut ordered: Vec<Stage<'_, T>> = grouped.into_values().collect();
    for stage in &mut ordered {
        stage.builds.sort_by_key(|b| b.id());
    }
    // into_values yields name order, so a stable sort keeps names as the tie-break
    ordered.sort_by_key(|stage| stage.idx);
    ordered
}

/// Distinct stage names in pipeline order
pub fn stage_names<T: StatusView>(builds: &[T]) -> Vec<String> {
    stages(builds)
        .into_iter()
        .map(|stage| stage.name.to_string())
        .collect()
}

/// Whether `build` must wait for earlier stages.
///
/// A build is blocked until the latest attempt of every build in every
/// earlier stage is complete or an ignored failure.
pub fn is_blocked<T: StatusView, B: StatusView + ?Sized>(builds: &[T], build: &B) -> bool {
    let ordered = stages(builds);
    let own_idx = ordered
        .iter()
        .find(|stage| stage.name == build.stage())
        .map(|stage| stage.idx)
        .unwrap_or(build.stage_idx());

    let index = LatestIndex::new(builds);
    builds
        .iter()
        .filter(|b| index.is_latest(*b))
        .filter(|b| {
            ordered
                .iter()
                .find(|stage| stage.name == b.stage())
                .is_some_and(|stage| stage.idx < own_idx)
        })
        .any(|b| !(b.status().is_complete() || b.is_ignored()))
}

/// Check stage indexes as handed over by a plan parser.
///
/// Entries must be in non-decreasing index order, each stage name must map
/// to exactly one index, and distinct stages must not share an index.
pub fn validate_stage_indices<'a, I>(entries: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    let mut by_name: BTreeMap<&str, u32> = BTreeMap::new();
    let mut by_idx: BTreeMap<u32, &str> = BTreeMap::new();
    let mut previous: Option<u32> = None;

    for (stage, idx) in entries {
        if let Some(prev) = previous {
            if idx < prev {
                return Err(ValidationError::StageOutOfOrder {
                    stage: stage.to_string(),
                    idx,
                    previous: prev,
                });
            }
        }
        previous = Some(idx);

        if let Some(&first) = by_name.get(stage) {
            if first != idx {
                return Err(ValidationError::ConflictingStageIndex {
                    stage: stage.to_string(),
                    first,
                    second: idx,
                });
            }
        }
        if let Some(&other) = by_idx.get(&idx) {
            if other != stage {
                return Err(ValidationError::SharedStageIndex {
                    first: other.to_string(),
                    second: stage.to_string(),
                    idx,
                });
            }
        }
        by_name.insert(stage, idx);
        by_idx.insert(idx, stage);
    }
    Ok(())
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
