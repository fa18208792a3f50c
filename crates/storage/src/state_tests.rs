// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use huntsync_core::{Change, PuzzleDraft, RoundDraft};
use serde_json::json;

fn round() -> Round {
    RoundDraft::new("Cavern", "🦇").into_round(RoundId(5))
}

fn puzzle(id: i64) -> Puzzle {
    PuzzleDraft::new("Alpha", RoundId(5), "https://x")
        .into_record(PuzzleId(id))
        .join(round())
}

fn change_op(event: ChangeEvent) -> Operation {
    Operation::change(&event)
}

#[test]
fn change_ops_update_rows_and_journal() {
    let mut state = MaterializedState::new(16);
    state.apply(&change_op(
        Change::<Round>::new(None, Some(round()), ChangeId(1)).into(),
    ));
    state.apply(&change_op(
        Change::new(None, Some(puzzle(3)), ChangeId(2)).into(),
    ));

    assert_eq!(state.rounds.len(), 1);
    assert_eq!(state.puzzle(PuzzleId(3)).unwrap().round.name, "Cavern");
    assert_eq!(state.changelog.len(), 2);
    assert_eq!(state.last_change_id, ChangeId(2));
    assert_eq!(state.allocate_puzzle_id(), PuzzleId(4));
    assert_eq!(state.allocate_round_id(), RoundId(6));
}

#[test]
fn deletion_removes_row_but_keeps_id_reserved() {
    let mut state = MaterializedState::new(16);
    state.apply(&change_op(
        Change::<Round>::new(None, Some(round()), ChangeId(1)).into(),
    ));
    state.apply(&change_op(
        Change::new(None, Some(puzzle(1)), ChangeId(2)).into(),
    ));
    state.apply(&change_op(
        Change::new(Some(puzzle(1)), None, ChangeId(3)).into(),
    ));

    assert!(state.puzzles.is_empty());
    assert_eq!(state.allocate_puzzle_id(), PuzzleId(2));
}

#[test]
fn setting_put_overwrites() {
    let mut state = MaterializedState::new(16);
    state.apply(&Operation::setting("sync_epoch", json!(1)));
    state.apply(&Operation::setting("sync_epoch", json!(2)));
    assert_eq!(state.settings.get("sync_epoch"), Some(&json!(2)));
}

#[test]
fn snapshot_restores_equivalent_state() {
    let mut state = MaterializedState::new(16);
    state.apply(&change_op(
        Change::<Round>::new(None, Some(round()), ChangeId(1)).into(),
    ));
    state.apply(&change_op(
        Change::new(None, Some(puzzle(9)), ChangeId(2)).into(),
    ));
    state.apply(&Operation::setting("discovery_enabled", json!(false)));

    let mut restored = MaterializedState::new(16);
    restored.apply(&Operation::Snapshot(state.snapshot()));

    assert_eq!(restored.puzzles, state.puzzles);
    assert_eq!(restored.rounds, state.rounds);
    assert_eq!(restored.settings, state.settings);
    assert_eq!(restored.changelog.len(), 2);
    assert_eq!(restored.last_change_id, ChangeId(2));
    assert_eq!(restored.allocate_puzzle_id(), PuzzleId(10));
}

#[test]
fn puzzles_without_rounds_are_not_joined() {
    let mut state = MaterializedState::new(16);
    state.apply(&change_op(
        Change::new(None, Some(puzzle(1)), ChangeId(1)).into(),
    ));
    assert!(state.puzzle(PuzzleId(1)).is_none());
    assert!(state.joined_puzzles().is_empty());
}
