// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL operation types
//!
//! Every durable state change is one operation. Replaying the operations in
//! order rebuilds the materialized state.

use huntsync_core::{ChangeEvent, ChangeId, PuzzleRecord, Round};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// A puzzle or round mutation. Updates the row and appends to the
    /// changelog.
    Change(ChangeOp),
    SettingPut(SettingPutOp),
    /// Full state written by compaction
    Snapshot(SnapshotOp),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeOp {
    pub event: ChangeEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingPutOp {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotOp {
    pub puzzles: Vec<PuzzleRecord>,
    pub rounds: Vec<Round>,
    pub settings: BTreeMap<String, serde_json::Value>,
    pub changelog: Vec<ChangeEvent>,
    pub last_change_id: ChangeId,
    #[serde(default)]
    pub next_puzzle_id: i64,
    #[serde(default)]
    pub next_round_id: i64,
}

impl Operation {
    pub fn change(event: &ChangeEvent) -> Self {
        Operation::Change(ChangeOp {
            event: event.detached(),
        })
    }

    pub fn setting(key: impl Into<String>, value: serde_json::Value) -> Self {
        Operation::SettingPut(SettingPutOp {
            key: key.into(),
            value,
        })
    }
}
