// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry-aware dependency resolution
//!
//! Rows sharing a (name, ref) pair are attempts of the same job; the one
//! with the largest id is current. Downstream builds always depend on the
//! current attempt of each earlier job, never on a superseded one.

use crate::id::BuildId;
use crate::status::StatusView;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Index from (name, ref) to the current attempt's id
#[derive(Debug, Clone, Default)]
pub struct LatestIndex {
    current: HashMap<(String, String), BuildId>,
}

impl LatestIndex {
    pub fn new<T: StatusView>(builds: &[T]) -> Self {
        let mut current: HashMap<(String, String), BuildId> = HashMap::new();
        for build in builds {
            current
                .entry((build.name().to_string(), build.git_ref().to_string()))
                .and_modify(|id| *id = (*id).max(build.id()))
                .or_insert(build.id());
        }
        Self { current }
    }

    /// Current attempt for a job, if any
    pub fn current(&self, name: &str, git_ref: &str) -> Option<BuildId> {
        self.current
            .get(&(name.to_string(), git_ref.to_string()))
            .copied()
    }

    pub fn is_latest<T: StatusView>(&self, build: &T) -> bool {
        self.current(build.name(), build.git_ref()) == Some(build.id())
    }

    /// The attempt that replaced `build`, if it has been retried
    pub fn superseded_by<T: StatusView>(&self, build: &T) -> Option<BuildId> {
        self.current(build.name(), build.git_ref())
            .filter(|id| *id != build.id())
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

/// Current attempt of every (name, ref) pair, ascending by id
pub fn latest<T: StatusView>(builds: &[T]) -> Vec<&T> {
    let index = LatestIndex::new(builds);
    let mut current: Vec<&T> = builds.iter().filter(|b| index.is_latest(*b)).collect();
    current.sort_by_key(|b| b.id());
    current
}

/// Superseded attempts, newest first
pub fn retried<T: StatusView>(builds: &[T]) -> Vec<&T> {
    let index = LatestIndex::new(builds);
    let mut superseded: Vec<&T> = builds.iter().filter(|b| !index.is_latest(*b)).collect();
    superseded.sort_by_key(|b| std::cmp::Reverse(b.id()));
    superseded
}

/// Builds in earlier stages that `build` depends on.
///
/// Takes every build with a smaller stage index, keeps the largest id per
/// name, and orders the result by id. A first-stage build has none.
pub fn depends_on_builds<'a, T: StatusView, B: StatusView + ?Sized>(
    builds: &'a [T],
    build: &B,
) -> Vec<&'a T> {
    let mut by_name: BTreeMap<&str, &'a T> = BTreeMap::new();
    for candidate in builds.iter().filter(|b| b.stage_idx() < build.stage_idx()) {
        keep_newest(&mut by_name, candidate);
    }
    sorted_by_id(by_name.into_values())
}

fn keep_newest<'a, T: StatusView>(by_name: &mut BTreeMap<&'a str, &'a T>, candidate: &'a T) {
    by_name
        .entry(candidate.name())
        .and_modify(|current| {
            if candidate.id() > current.id() {
                *current = candidate;
            }
        })
        .or_insert(candidate);
}

fn sorted_by_id<'a, T: StatusView>(builds: impl IntoIterator<Item = &'a T>) -> Vec<&'a T>
where
    T: 'a,
{
    let mut builds: Vec<&T> = builds.into_iter().collect();
    builds.sort_by_key(|b| b.id());
    builds
}

/// Precomputed dependencies for every stage index of a snapshot.
///
/// Built once; each lookup is a map access instead of a scan.
pub struct DependencyGraph<'a, T> {
    builds: &'a [T],
    /// For each stage index present, the builds (by position) it depends on
    upstream: BTreeMap<u32, Vec<usize>>,
    /// Newest attempt per name across every stage
    all: Vec<usize>,
}

impl<'a, T: StatusView> DependencyGraph<'a, T> {
    pub fn new(builds: &'a [T]) -> Self {
        let mut by_stage: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (pos, build) in builds.iter().enumerate() {
            by_stage.entry(build.stage_idx()).or_default().push(pos);
        }

        let mut upstream = BTreeMap::new();
        let mut newest: BTreeMap<&str, usize> = BTreeMap::new();
        for (idx, positions) in &by_stage {
            upstream.insert(*idx, Self::ordered(builds, &newest));
            for &pos in positions {
                let name = builds[pos].name();
                let replace = newest
                    .get(name)
                    .map_or(true, |&cur| builds[pos].id() > builds[cur].id());
                if replace {
                    newest.insert(name, pos);
                }
            }
        }
        let all = Self::ordered(builds, &newest);

        Self {
            builds,
            upstream,
            all,
        }
    }

    fn ordered(builds: &[T], newest: &BTreeMap<&str, usize>) -> Vec<usize> {
        let mut positions: Vec<usize> = newest.values().copied().collect();
        positions.sort_by_key(|&pos| builds[pos].id());
        positions
    }

    /// Dependencies of any build at stage index `stage_idx`
    pub fn upstream_of_stage(&self, stage_idx: u32) -> Vec<&'a T> {
        let positions = self
            .upstream
            .range(stage_idx..)
            .next()
            .map(|(_, positions)| positions)
            .unwrap_or(&self.all);
        positions.iter().map(|&pos| &self.builds[pos]).collect()
    }

    pub fn depends_on<B: StatusView + ?Sized>(&self, build: &B) -> Vec<&'a T> {
        self.upstream_of_stage(build.stage_idx())
    }

    /// Builds that list `build` among their dependencies
    pub fn dependents<B: StatusView + ?Sized>(&self, build: &B) -> Vec<&'a T> {
        let id = build.id();
        let downstream_stages: HashSet<u32> = self
            .upstream
            .iter()
            .filter(|(_, positions)| positions.iter().any(|&pos| self.builds[pos].id() == id))
            .map(|(idx, _)| *idx)
            .collect();
        let mut dependents: Vec<&T> = self
            .builds
            .iter()
            .filter(|b| downstream_stages.contains(&b.stage_idx()))
            .collect();
        dependents.sort_by_key(|b| b.id());
        dependents
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
