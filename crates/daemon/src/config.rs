// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file

use huntsync_core::events::DEFAULT_QUEUE_CAPACITY;
use huntsync_engine::EngineConfig;
use huntsync_storage::DEFAULT_CHANGELOG_SIZE;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the state directory when the config file doesn't set one
pub const STATE_DIR_ENV: &str = "HUNTSYNC_STATE_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("invalid config {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("could not determine state directory")]
    NoStateDir,
}

/// Contents of `huntsync.toml`. Every field has a default, so an empty
/// file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// Store, lock and log directory
    pub state_dir: Option<PathBuf>,
    /// Defaults to `huntsyncd.log` in the state directory
    pub log_path: Option<PathBuf>,
    /// Changes kept in the journal for recovery and catch-up
    pub changelog_size: usize,
    /// Per-consumer change queue size
    pub bus_capacity: usize,
    pub engine: EngineConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            log_path: None,
            changelog_size: DEFAULT_CHANGELOG_SIZE,
            bus_capacity: DEFAULT_QUEUE_CAPACITY,
            engine: EngineConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Read a config file. A missing `path` means all defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::parse(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Resolve every on-disk location
    pub fn paths(&self) -> Result<Paths, ConfigError> {
        let state_dir = match &self.state_dir {
            Some(dir) => dir.clone(),
            None => default_state_dir()?,
        };
        let log_path = self
            .log_path
            .clone()
            .unwrap_or_else(|| state_dir.join("huntsyncd.log"));
        Ok(Paths {
            store_dir: state_dir.join("store"),
            lock_path: state_dir.join("huntsyncd.pid"),
            log_path,
            state_dir,
        })
    }
}

/// On-disk locations used by the daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub state_dir: PathBuf,
    pub store_dir: PathBuf,
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
}

fn default_state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    // macOS has no state dir
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|dir| dir.join("huntsync"))
        .ok_or(ConfigError::NoStateDir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
