// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rounds proposed by discovery, awaiting a human-chosen emoji

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A puzzle found by discovery in a round that doesn't exist yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedPuzzle {
    pub name: String,
    pub round: String,
    pub url: String,
}

/// A pending round proposal, persisted until it is committed or dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedRound {
    /// The chat message whose reactions carry the emoji signal
    pub message_id: String,
    pub name: String,
    pub notified_at: DateTime<Utc>,
    pub puzzles: Vec<ProposedPuzzle>,
}
