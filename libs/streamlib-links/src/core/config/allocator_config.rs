// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Link allocator configuration via `streamlib-links.yaml`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::core::links::DEFAULT_LINK_CAPACITY;
use crate::core::{Result, StreamError};

/// Environment variable overriding [`AllocatorConfig::drain_timeout_ms`].
pub const DRAIN_TIMEOUT_ENV: &str = "STREAMLIB_LINK_DRAIN_TIMEOUT_MS";

/// Allocator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllocatorConfig {
    /// How long a swap waits for the old link to drain. Unset waits forever.
    #[serde(default)]
    pub drain_timeout_ms: Option<u64>,

    /// Ring buffer capacity for links created by callers that do not pick one.
    #[serde(default = "default_capacity")]
    pub default_capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_LINK_CAPACITY
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            drain_timeout_ms: None,
            default_capacity: default_capacity(),
        }
    }
}

impl AllocatorConfig {
    /// Configuration file name.
    pub const FILE_NAME: &'static str = "streamlib-links.yaml";

    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_ms.map(Duration::from_millis)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| StreamError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory. Returns error if the file is
    /// missing or cannot be parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            StreamError::Configuration(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let config = Self::from_yaml_str(&content)?.with_env_overrides()?;
        tracing::info!("Loaded link allocator config from {}", config_path.display());
        Ok(config)
    }

    /// Load configuration from a directory, returning defaults if the file is
    /// missing or unparseable.
    pub fn load_or_default(dir: &Path) -> Self {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            tracing::debug!(
                "No {} found in {}, using defaults",
                Self::FILE_NAME,
                dir.display()
            );
            return Self::default().with_env_overrides().unwrap_or_default();
        }

        match Self::load(dir) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default().with_env_overrides().unwrap_or_default()
            }
        }
    }

    /// Apply [`DRAIN_TIMEOUT_ENV`] if set.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var(DRAIN_TIMEOUT_ENV) {
            let ms = raw.trim().parse::<u64>().map_err(|e| {
                StreamError::Configuration(format!("{}='{}': {}", DRAIN_TIMEOUT_ENV, raw, e))
            })?;
            self.drain_timeout_ms = Some(ms);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.default_capacity == 0 {
            return Err(StreamError::Configuration(
                "default_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
