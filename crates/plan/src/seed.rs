// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning job definitions into pending build rows

use crate::job::{validate_stage_order, BuildDef};
use cg_core::{Build, Clock, Config, IdGen, Pipeline, ValidationError};

/// Create one pending build per definition, in the order given.
///
/// Ids come from `id_gen`, so rows created later always sort after rows
/// created earlier. Jobs without a declared artifact expiry inherit the
/// configured default.
pub fn seed(
    defs: &[BuildDef],
    pipeline: &Pipeline,
    id_gen: &impl IdGen,
    clock: &impl Clock,
    config: &Config,
) -> Result<Vec<Build>, ValidationError> {
    validate_stage_order(defs)?;

    let builds: Vec<Build> = defs
        .iter()
        .map(|def| {
            Build::new(
                id_gen.next(),
                pipeline,
                &def.name,
                &def.stage,
                def.stage_idx,
                clock,
            )
            .with_tags(def.tags.iter().cloned())
            .with_allow_failure(def.allow_failure)
            .with_when(def.when)
            .with_variables(def.variables.clone())
            .with_artifacts_expire_in(
                def.expire_in
                    .clone()
                    .or_else(|| config.default_artifacts_expire_in.clone()),
            )
        })
        .collect();

    tracing::debug!(pipeline_id = %pipeline.id, builds = builds.len(), "seeded builds");
    Ok(builds)
}

#[cfg(test)]
#[path = "seed_tests.rs"]
mod tests;
