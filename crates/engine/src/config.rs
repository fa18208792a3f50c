// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration

use huntsync_core::NoticeTarget;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat channels the engine posts to, by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelNames {
    /// New and newly-worked puzzles
    pub more_eyes: String,
    /// Solve announcements
    pub hanging_out: String,
    /// Quartermaster alerts and round proposals
    pub qm: String,
    /// Named in "please contact" notices
    pub tech: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            more_eyes: "more-eyes".to_string(),
            hanging_out: "hanging-out".to_string(),
            qm: "qm".to_string(),
            tech: "tech".to_string(),
        }
    }
}

impl ChannelNames {
    pub fn resolve<'a>(&'a self, target: &'a NoticeTarget) -> &'a str {
        match target {
            NoticeTarget::MoreEyes => &self.more_eyes,
            NoticeTarget::HangingOut => &self.hanging_out,
            NoticeTarget::Qm => &self.qm,
            NoticeTarget::Channel(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a rename may block before checking for a rate limit
    #[serde(with = "humantime_serde")]
    pub rate_limit_window: Duration,
    /// Quiet period between an emoji vote and round creation
    #[serde(with = "humantime_serde")]
    pub quiet_period: Duration,
    pub channels: ChannelNames,
    /// Number of "Solved" archive categories
    pub archive_count: usize,
    /// Larger proposal bursts are refused
    pub max_new_rounds: usize,
    /// Puzzles listed per round proposal notice
    pub proposal_puzzle_limit: usize,
    /// Periodic structural health check; off when unset
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub depth_check_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rate_limit_window: Duration::from_secs(5),
            quiet_period: Duration::from_secs(10),
            channels: ChannelNames::default(),
            archive_count: 3,
            max_new_rounds: 4,
            proposal_puzzle_limit: 15,
            sweep_interval: None,
            depth_check_interval: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
