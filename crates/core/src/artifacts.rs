// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact retention and erasure
//!
//! Blob deletion is never performed here. Erasing a build yields effects
//! naming the blobs to delete; the caller executes them.

use crate::build::Build;
use crate::clock::Clock;
use crate::config::Config;
use crate::effect::{Effect, Event};
use crate::error::{ConflictError, CoreError, ValidationError};
use crate::id::UserId;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A stored blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub path: String,
    pub size: u64,
}

impl ArtifactFile {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Artifact metadata attached to a build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    #[serde(default)]
    pub archive: Option<ArtifactFile>,
    #[serde(default)]
    pub metadata: Option<ArtifactFile>,
    #[serde(default)]
    pub expire_at: Option<DateTime<Utc>>,
    /// Retention declared by the job, applied when blobs are attached
    #[serde(default)]
    pub expire_in: Option<String>,
}

/// Result of an erase request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EraseOutcome {
    /// Build was erased; apply these effects to remove the blobs
    Erased(Vec<Effect>),
    /// Nothing to erase (already erased, still active, or empty)
    NotErasable,
}

impl EraseOutcome {
    pub fn is_erased(&self) -> bool {
        matches!(self, EraseOutcome::Erased(_))
    }

    pub fn effects(&self) -> &[Effect] {
        match self {
            EraseOutcome::Erased(effects) => effects,
            EraseOutcome::NotErasable => &[],
        }
    }
}

/// Parse a human-readable duration such as `"7 days"` or `"2 hrs 30 min"`.
///
/// `"never"` yields `None` (no expiry). A bare integer is seconds.
pub fn parse_expire_in(input: &str) -> Result<Option<Duration>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("never") {
        return Ok(None);
    }
    let invalid = |reason: String| ValidationError::InvalidDuration {
        input: input.to_string(),
        reason,
    };
    if trimmed.is_empty() {
        return Err(invalid("empty duration".to_string()));
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let secs = trimmed
            .parse::<u64>()
            .map_err(|e| invalid(e.to_string()))?;
        return Ok(Some(Duration::from_secs(secs)));
    }
    humantime::parse_duration(trimmed)
        .map(Some)
        .map_err(|e| invalid(e.to_string()))
}

impl Build {
    /// Archive present and not expired
    pub fn has_artifacts(&self, clock: &impl Clock) -> bool {
        self.artifacts.archive.is_some() && !self.artifacts_expired(clock)
    }

    /// `expire_at` set and in the past
    pub fn artifacts_expired(&self, clock: &impl Clock) -> bool {
        self.artifacts
            .expire_at
            .is_some_and(|expire_at| expire_at < clock.now())
    }

    /// Set expiry relative to now. `None` (or `"never"`) clears it.
    pub fn set_expire_in(
        &mut self,
        value: Option<&str>,
        clock: &impl Clock,
    ) -> Result<(), ValidationError> {
        let duration = match value {
            Some(value) => parse_expire_in(value)?,
            None => None,
        };
        self.artifacts.expire_at = match duration {
            Some(duration) => {
                let delta =
                    TimeDelta::from_std(duration).map_err(|e| ValidationError::InvalidDuration {
                        input: value.unwrap_or_default().to_string(),
                        reason: e.to_string(),
                    })?;
                Some(clock.now().checked_add_signed(delta).ok_or_else(|| {
                    ValidationError::InvalidDuration {
                        input: value.unwrap_or_default().to_string(),
                        reason: "duration out of range".to_string(),
                    }
                })?)
            }
            None => None,
        };
        Ok(())
    }

    /// Record uploaded blobs and start the expiry clock.
    ///
    /// The job's declared `expire_in` wins over the configured default.
    /// Erased builds reject new uploads.
    pub fn attach_artifacts(
        &mut self,
        archive: ArtifactFile,
        metadata: Option<ArtifactFile>,
        config: &Config,
        clock: &impl Clock,
    ) -> Result<(), CoreError> {
        self.ensure_not_erased()?;
        let expire_in = self
            .artifacts
            .expire_in
            .clone()
            .or_else(|| config.default_artifacts_expire_in.clone());
        self.set_expire_in(expire_in.as_deref(), clock)?;
        self.artifacts.archive = Some(archive);
        self.artifacts.metadata = metadata;
        tracing::debug!(id = %self.id, expire_at = ?self.artifacts.expire_at, "artifacts attached");
        Ok(())
    }

    /// Remaining time until expiry; zero once expired
    pub fn expire_in(&self, clock: &impl Clock) -> Option<Duration> {
        let expire_at = self.artifacts.expire_at?;
        Some((expire_at - clock.now()).to_std().unwrap_or(Duration::ZERO))
    }

    /// Keep artifacts forever
    pub fn keep_artifacts(&mut self) {
        self.artifacts.expire_at = None;
    }

    pub fn has_trace(&self) -> bool {
        self.trace.is_some()
    }

    pub fn is_erased(&self) -> bool {
        self.erased_at.is_some()
    }

    /// Complete, not yet erased, and still holding a trace or live artifacts
    pub fn is_erasable(&self, clock: &impl Clock) -> bool {
        self.is_complete() && !self.is_erased() && (self.has_trace() || self.has_artifacts(clock))
    }

    /// Append job output. An erased build takes no further output.
    pub fn append_trace(&mut self, output: &str) -> Result<(), ConflictError> {
        self.ensure_not_erased()?;
        self.trace.get_or_insert_with(String::new).push_str(output);
        Ok(())
    }

    fn ensure_not_erased(&self) -> Result<(), ConflictError> {
        if self.is_erased() {
            return Err(ConflictError::Erased { id: self.id });
        }
        Ok(())
    }

    /// Erase artifacts and trace. `erased_by` of `None` means the system did it.
    ///
    /// Calling this on a build that is not erasable changes nothing.
    pub fn erase(&mut self, erased_by: Option<UserId>, clock: &impl Clock) -> EraseOutcome {
        if !self.is_erasable(clock) {
            tracing::debug!(id = %self.id, "build not erasable");
            return EraseOutcome::NotErasable;
        }

        let mut effects = self.take_artifact_blobs();
        if self.trace.take().is_some() {
            effects.push(Effect::EraseTrace { build_id: self.id });
        }
        self.erased_at = Some(clock.now());
        self.erased_by = erased_by;

        tracing::info!(id = %self.id, erased_by = ?erased_by, "build erased");
        effects.push(Effect::Emit(Event::BuildErased {
            id: self.id,
            erased_by,
        }));
        EraseOutcome::Erased(effects)
    }

    /// Drop expired artifact blobs without marking the build erased
    pub fn remove_expired_artifacts(&mut self, clock: &impl Clock) -> Vec<Effect> {
        if !self.artifacts_expired(clock) || self.artifacts.archive.is_none() {
            return Vec::new();
        }
        let mut effects = self.take_artifact_blobs();
        effects.push(Effect::Emit(Event::ArtifactsExpired { id: self.id }));
        effects
    }

    fn take_artifact_blobs(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        let declared = self.artifacts.expire_in.take();
        let artifacts = std::mem::take(&mut self.artifacts);
        self.artifacts.expire_in = declared;
        if let Some(archive) = artifacts.archive {
            effects.push(Effect::DeleteArtifactArchive {
                build_id: self.id,
                path: archive.path,
            });
        }
        if let Some(metadata) = artifacts.metadata {
            effects.push(Effect::DeleteArtifactMetadata {
                build_id: self.id,
                path: metadata.path,
            });
        }
        effects
    }
}

/// Builds whose archive has expired but not yet been removed
pub fn expired_artifacts<'a>(builds: &'a [Build], clock: &impl Clock) -> Vec<&'a Build> {
    builds
        .iter()
        .filter(|b| b.artifacts.archive.is_some() && b.artifacts_expired(clock))
        .collect()
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
