// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sort planning for chat channels and categories
//!
//! Planning is pure: given every entity's sort fields and the positions the
//! chat system currently reports, produce the position of the entity being
//! placed and the minimal list of repositions.

use crate::id::{PuzzleId, RoundId};
use crate::puzzle::Puzzle;
use crate::round::Round;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Positions start here; lower positions belong to manually-managed channels
pub const BASE_SORT_OFFSET: i64 = 64;

/// Archive categories sit after every round category
pub const ARCHIVE_SORT_OFFSET: i64 = BASE_SORT_OFFSET * 4;

/// A single reposition request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOrder {
    pub id: String,
    pub position: i64,
}

impl ChannelOrder {
    pub fn new(id: impl Into<String>, position: i64) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Result of a planning pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortPlan {
    /// Position computed for the entity being placed
    pub position: i64,
    /// Repositions needed, in sorted order
    pub orders: Vec<ChannelOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSortFields {
    pub id: RoundId,
    pub category: Option<String>,
    pub name: String,
    pub special: bool,
    pub sort: i64,
}

impl RoundSortFields {
    pub fn of(round: &Round) -> Self {
        Self {
            id: round.id,
            category: round.category.as_assigned().map(str::to_string),
            name: round.name.clone(),
            special: round.special,
            sort: round.sort,
        }
    }
}

/// Special rounds first, then by sort key, then by id
pub fn round_order(a: &RoundSortFields, b: &RoundSortFields) -> Ordering {
    b.special
        .cmp(&a.special)
        .then(a.sort.cmp(&b.sort))
        .then(a.id.cmp(&b.id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleSortFields {
    pub id: PuzzleId,
    pub channel: Option<String>,
    pub is_solved: bool,
    pub name: String,
    pub meta: bool,
    pub round: RoundSortFields,
}

impl PuzzleSortFields {
    pub fn of(puzzle: &Puzzle) -> Self {
        Self {
            id: puzzle.id,
            channel: puzzle.channel.as_assigned().map(str::to_string),
            is_solved: puzzle.status.is_solved(),
            name: puzzle.name.clone(),
            meta: puzzle.meta,
            round: RoundSortFields::of(&puzzle.round),
        }
    }
}

/// Round order, then metas after regular puzzles, then case-insensitive name
pub fn puzzle_order(a: &PuzzleSortFields, b: &PuzzleSortFields) -> Ordering {
    round_order(&a.round, &b.round)
        .then(a.meta.cmp(&b.meta))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Place `target` among `existing` puzzles. `target` replaces the entry with
/// the same id, or is added if it isn't stored yet.
///
/// Positions are scoped per round so adding a puzzle only shifts puzzles in
/// its own round. Solved puzzles and puzzles whose channel isn't in
/// `current` are skipped.
pub fn plan_puzzles(
    existing: &[PuzzleSortFields],
    target: &PuzzleSortFields,
    current: &HashMap<String, i64>,
) -> SortPlan {
    let mut puzzles: Vec<&PuzzleSortFields> =
        existing.iter().filter(|p| p.id != target.id).collect();
    puzzles.push(target);
    puzzles.sort_by(|a, b| puzzle_order(a, b));

    let mut plan = SortPlan::default();
    let mut position = BASE_SORT_OFFSET;
    let mut round = None;
    for p in puzzles {
        if round != Some(p.round.id) {
            position = BASE_SORT_OFFSET;
            round = Some(p.round.id);
        }
        position += 1;
        if p.id == target.id {
            plan.position = position;
        }
        if p.is_solved {
            continue;
        }
        let Some(channel) = &p.channel else {
            continue;
        };
        match current.get(channel) {
            Some(&at) if at != position => plan.orders.push(ChannelOrder::new(channel, position)),
            _ => {}
        }
    }
    plan
}

/// Place `target` among `existing` rounds, then pin the archive categories
/// after every round. Categories missing from `current` are skipped.
pub fn plan_rounds(
    existing: &[RoundSortFields],
    target: &RoundSortFields,
    archives: &[String],
    current: &HashMap<String, i64>,
) -> SortPlan {
    let mut rounds: Vec<&RoundSortFields> =
        existing.iter().filter(|r| r.id != target.id).collect();
    rounds.push(target);
    rounds.sort_by(|a, b| round_order(a, b));

    let mut plan = SortPlan::default();
    let mut push_if_moved = |id: &str, position: i64| {
        if matches!(current.get(id), Some(&at) if at != position) {
            plan.orders.push(ChannelOrder::new(id, position));
        }
    };
    let mut found = BASE_SORT_OFFSET;
    for (i, r) in rounds.iter().enumerate() {
        let position = BASE_SORT_OFFSET + i as i64;
        if r.id == target.id {
            found = position;
        }
        if let Some(category) = &r.category {
            push_if_moved(category, position);
        }
    }
    for (i, archive) in archives.iter().enumerate() {
        push_if_moved(archive, ARCHIVE_SORT_OFFSET + i as i64);
    }
    plan.position = found;
    plan
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod tests;
