// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Puzzle solving status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Where a puzzle stands. Persisted with the display names below; the
/// not-started state is persisted as an empty string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "")]
    NotStarted,
    Working,
    Abandoned,
    Solved,
    Backsolved,
    Purchased,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status {0:?}")]
pub struct UnknownStatus(pub String);

impl Status {
    pub const ALL: [Status; 6] = [
        Status::NotStarted,
        Status::Working,
        Status::Abandoned,
        Status::Solved,
        Status::Backsolved,
        Status::Purchased,
    ];

    /// Solved, backsolved and purchased puzzles all carry an answer
    pub fn is_solved(self) -> bool {
        matches!(self, Status::Solved | Status::Backsolved | Status::Purchased)
    }

    /// Human-facing label, used in pinned messages
    pub fn pretty(self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::Working => "✍️ Working",
            Status::Abandoned => "🗑️ Abandoned",
            Status::Solved => "🏅 Solved",
            Status::Backsolved => "🤦‍♀️ Backsolved",
            Status::Purchased => "💸 Purchased",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Status::NotStarted => "",
            Status::Working => "✍️",
            Status::Abandoned => "🗑️",
            Status::Solved => "🏅",
            Status::Backsolved => "🤦‍♀️",
            Status::Purchased => "💸",
        }
    }

    /// Past-tense verb for solve announcements; `None` for unsolved states
    pub fn solved_verb(self) -> Option<&'static str> {
        match self {
            Status::Solved => Some("solved"),
            Status::Backsolved => Some("backsolved"),
            Status::Purchased => Some("purchased"),
            _ => None,
        }
    }

    pub fn solved_exclamation(self) -> Option<&'static str> {
        match self {
            Status::Solved => Some("solve!"),
            Status::Backsolved => Some("backsolve!!"),
            Status::Purchased => Some("free answer."),
            _ => None,
        }
    }

    fn persisted(self) -> &'static str {
        match self {
            Status::NotStarted => "",
            Status::Working => "Working",
            Status::Abandoned => "Abandoned",
            Status::Solved => "Solved",
            Status::Backsolved => "Backsolved",
            Status::Purchased => "Purchased",
        }
    }
}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Not Started" {
            return Ok(Status::NotStarted);
        }
        Status::ALL
            .into_iter()
            .find(|status| status.persisted() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotStarted => f.write_str("Not Started"),
            other => f.write_str(other.persisted()),
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
