// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events for state machine orchestration

use crate::id::{BuildId, PipelineId, UserId};
use crate::status::Status;
use serde::{Deserialize, Serialize};

/// Side effects that the state machine requests from its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Emit an event for other components to observe
    Emit(Event),
    /// Delete an artifact archive blob
    DeleteArtifactArchive { build_id: BuildId, path: String },
    /// Delete an artifact metadata blob
    DeleteArtifactMetadata { build_id: BuildId, path: String },
    /// Delete a build's trace content
    EraseTrace { build_id: BuildId },
}

impl Effect {
    /// Short name for spans and logs
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Emit(_) => "emit",
            Effect::DeleteArtifactArchive { .. } => "delete_artifact_archive",
            Effect::DeleteArtifactMetadata { .. } => "delete_artifact_metadata",
            Effect::EraseTrace { .. } => "erase_trace",
        }
    }

    pub fn build_id(&self) -> Option<BuildId> {
        match self {
            Effect::Emit(_) => None,
            Effect::DeleteArtifactArchive { build_id, .. }
            | Effect::DeleteArtifactMetadata { build_id, .. }
            | Effect::EraseTrace { build_id } => Some(*build_id),
        }
    }
}

/// Events emitted by the state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    BuildStatusChanged {
        id: BuildId,
        pipeline_id: PipelineId,
        from: Status,
        to: Status,
    },
    BuildRetried {
        original: BuildId,
        retry: BuildId,
        pipeline_id: PipelineId,
    },
    BuildErased {
        id: BuildId,
        erased_by: Option<UserId>,
    },
    ArtifactsExpired {
        id: BuildId,
    },
}

impl Event {
    /// Get the event name for pattern matching
    pub fn name(&self) -> String {
        match self {
            Event::BuildStatusChanged { to, .. } => format!("build:{}", to),
            Event::BuildRetried { .. } => "build:retried".to_string(),
            Event::BuildErased { .. } => "build:erased".to_string(),
            Event::ArtifactsExpired { .. } => "artifacts:expired".to_string(),
        }
    }
}
