// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use crate::changelog::Changelog;
use crate::operation::{Operation, SnapshotOp};
use huntsync_core::{ChangeEvent, ChangeId, Puzzle, PuzzleId, PuzzleRecord, Round, RoundId};
use std::collections::BTreeMap;

/// Rows, settings and the changelog, as rebuilt from the WAL
#[derive(Debug, Clone, Default)]
pub struct MaterializedState {
    pub puzzles: BTreeMap<PuzzleId, PuzzleRecord>,
    pub rounds: BTreeMap<RoundId, Round>,
    pub settings: BTreeMap<String, serde_json::Value>,
    pub changelog: Changelog,
    pub last_change_id: ChangeId,
    next_puzzle_id: i64,
    next_round_id: i64,
}

impl MaterializedState {
    pub fn new(changelog_size: usize) -> Self {
        Self {
            changelog: Changelog::new(changelog_size),
            next_puzzle_id: 1,
            next_round_id: 1,
            ..Self::default()
        }
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::Change(change) => {
                self.apply_event(&change.event);
                self.changelog.push(&change.event);
                self.last_change_id = self.last_change_id.max(change.event.change_id());
            }
            Operation::SettingPut(put) => {
                self.settings.insert(put.key.clone(), put.value.clone());
            }
            Operation::Snapshot(snapshot) => self.restore(snapshot),
        }
    }

    fn apply_event(&mut self, event: &ChangeEvent) {
        match event {
            ChangeEvent::Puzzle(change) => match (&change.before, &change.after) {
                (_, Some(after)) => self.put_puzzle(after.record()),
                (Some(before), None) => {
                    self.next_puzzle_id = self.next_puzzle_id.max(before.id.0 + 1);
                    self.puzzles.remove(&before.id);
                }
                (None, None) => {}
            },
            ChangeEvent::Round(change) => match (&change.before, &change.after) {
                (_, Some(after)) => self.put_round(after.clone()),
                (Some(before), None) => {
                    self.next_round_id = self.next_round_id.max(before.id.0 + 1);
                    self.rounds.remove(&before.id);
                }
                (None, None) => {}
            },
        }
    }

    fn put_puzzle(&mut self, record: PuzzleRecord) {
        self.next_puzzle_id = self.next_puzzle_id.max(record.id.0 + 1);
        self.puzzles.insert(record.id, record);
    }

    fn put_round(&mut self, round: Round) {
        self.next_round_id = self.next_round_id.max(round.id.0 + 1);
        self.rounds.insert(round.id, round);
    }

    fn restore(&mut self, snapshot: &SnapshotOp) {
        self.puzzles.clear();
        self.rounds.clear();
        for record in &snapshot.puzzles {
            self.put_puzzle(record.clone());
        }
        for round in &snapshot.rounds {
            self.put_round(round.clone());
        }
        self.settings = snapshot.settings.clone();
        self.changelog = Changelog::new(self.changelog.capacity());
        for event in &snapshot.changelog {
            self.changelog.push(event);
        }
        self.last_change_id = snapshot.last_change_id;
        self.next_puzzle_id = self.next_puzzle_id.max(snapshot.next_puzzle_id);
        self.next_round_id = self.next_round_id.max(snapshot.next_round_id);
    }

    /// Capture the whole state as a single operation
    pub fn snapshot(&self) -> SnapshotOp {
        SnapshotOp {
            puzzles: self.puzzles.values().cloned().collect(),
            rounds: self.rounds.values().cloned().collect(),
            settings: self.settings.clone(),
            changelog: self.changelog.entries().cloned().collect(),
            last_change_id: self.last_change_id,
            next_puzzle_id: self.next_puzzle_id,
            next_round_id: self.next_round_id,
        }
    }

    /// Allocate the next puzzle id. Ids are never reused, even after deletion.
    pub fn allocate_puzzle_id(&mut self) -> PuzzleId {
        let id = PuzzleId(self.next_puzzle_id);
        self.next_puzzle_id += 1;
        id
    }

    pub fn allocate_round_id(&mut self) -> RoundId {
        let id = RoundId(self.next_round_id);
        self.next_round_id += 1;
        id
    }

    /// A stored puzzle joined with its round
    pub fn puzzle(&self, id: PuzzleId) -> Option<Puzzle> {
        let record = self.puzzles.get(&id)?;
        let round = self.rounds.get(&record.round)?;
        Some(record.clone().join(round.clone()))
    }

    /// Every puzzle joined with its round, ordered by id
    pub fn joined_puzzles(&self) -> Vec<Puzzle> {
        self.puzzles
            .values()
            .filter_map(|record| {
                let round = self.rounds.get(&record.round)?;
                Some(record.clone().join(round.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
