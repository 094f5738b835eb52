// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Loaded from TOML. Every field has a default so an empty file (or no
//! file at all) is a valid configuration.

use crate::artifacts::parse_expire_in;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How recently a runner must have checked in to count as online
    #[serde(with = "humantime_serde")]
    pub runner_liveness: Duration,
    /// Expiry applied to new artifacts when the job does not set one
    pub default_artifacts_expire_in: Option<String>,
    pub server_name: String,
    pub server_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runner_liveness: Duration::from_secs(60 * 60),
            default_artifacts_expire_in: None,
            server_name: "cg".to_string(),
            server_url: "http://localhost".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(expire_in) = &self.default_artifacts_expire_in {
            parse_expire_in(expire_in)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
