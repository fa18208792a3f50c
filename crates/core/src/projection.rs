// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field projections
//!
//! Each external facet of an entity depends on a narrow set of fields. A
//! projection captures exactly those fields; when the before and after
//! projections of a change differ, that facet is stale and needs repair.

use crate::puzzle::Puzzle;
use crate::round::Round;
use crate::status::Status;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// One independently repairable aspect of an entity's external representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    /// Puzzle chat channel name and category
    Channel,
    /// Pinned information message in the puzzle channel
    Pin,
    /// Spreadsheet title and parent folder
    Spreadsheet,
    /// Scheduled voice events
    VoiceRoom,
    /// Channel/category ordering
    Position,
    /// Round chat category name
    Category,
    /// Round document folder name
    Folder,
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Facet::Channel => "channel",
            Facet::Pin => "pin",
            Facet::Spreadsheet => "spreadsheet",
            Facet::VoiceRoom => "voice_room",
            Facet::Position => "position",
            Facet::Category => "category",
            Facet::Folder => "folder",
        };
        f.write_str(name)
    }
}

/// Facets a puzzle change is repaired through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PuzzleFacet {
    Channel,
    Pin,
    Spreadsheet,
    VoiceRoom,
    Position,
}

/// Facets a round change is repaired through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoundFacet {
    Category,
    Folder,
    Position,
}

impl From<PuzzleFacet> for Facet {
    fn from(facet: PuzzleFacet) -> Self {
        match facet {
            PuzzleFacet::Channel => Facet::Channel,
            PuzzleFacet::Pin => Facet::Pin,
            PuzzleFacet::Spreadsheet => Facet::Spreadsheet,
            PuzzleFacet::VoiceRoom => Facet::VoiceRoom,
            PuzzleFacet::Position => Facet::Position,
        }
    }
}

impl From<RoundFacet> for Facet {
    fn from(facet: RoundFacet) -> Self {
        match facet {
            RoundFacet::Category => Facet::Category,
            RoundFacet::Folder => Facet::Folder,
            RoundFacet::Position => Facet::Position,
        }
    }
}

impl fmt::Display for PuzzleFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Facet::from(*self).fmt(f)
    }
}

impl fmt::Display for RoundFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Facet::from(*self).fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelFields {
    pub puzzle_name: String,
    pub channel: Option<String>,
    pub round_name: String,
    pub round_category: Option<String>,
    pub is_solved: bool,
}

impl ChannelFields {
    pub fn of(puzzle: &Puzzle) -> Self {
        Self {
            puzzle_name: puzzle.name.clone(),
            channel: puzzle.channel.as_assigned().map(str::to_string),
            round_name: puzzle.round.name.clone(),
            round_category: puzzle.round.category.as_assigned().map(str::to_string),
            is_solved: puzzle.status.is_solved(),
        }
    }

    /// Channel title: solved puzzles get a check mark
    pub fn title(&self) -> String {
        solved_title(&self.puzzle_name, self.is_solved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinFields {
    pub round_name: String,
    pub round_emoji: String,
    pub puzzle_name: String,
    pub status: Status,
    pub note: String,
    pub location: String,
    pub puzzle_url: String,
    pub spreadsheet: Option<String>,
    pub channel: Option<String>,
    pub voice_room: Option<String>,
}

impl PinFields {
    pub fn of(puzzle: &Puzzle) -> Self {
        Self {
            round_name: puzzle.round.name.clone(),
            round_emoji: puzzle.round.emoji.clone(),
            puzzle_name: puzzle.name.clone(),
            status: puzzle.status,
            note: puzzle.note.clone(),
            location: puzzle.location.clone(),
            puzzle_url: puzzle.puzzle_url.clone(),
            spreadsheet: puzzle.spreadsheet.as_assigned().map(str::to_string),
            channel: puzzle.channel.as_assigned().map(str::to_string),
            voice_room: puzzle.voice_room.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpreadsheetFields {
    pub puzzle_name: String,
    pub spreadsheet: Option<String>,
    pub round_name: String,
    pub round_folder: Option<String>,
    pub is_solved: bool,
}

impl SpreadsheetFields {
    pub fn of(puzzle: &Puzzle) -> Self {
        Self {
            puzzle_name: puzzle.name.clone(),
            spreadsheet: puzzle.spreadsheet.as_assigned().map(str::to_string),
            round_name: puzzle.round.name.clone(),
            round_folder: puzzle.round.folder.as_assigned().map(str::to_string),
            is_solved: puzzle.status.is_solved(),
        }
    }

    pub fn title(&self) -> String {
        solved_title(&self.puzzle_name, self.is_solved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceRoomFields {
    pub puzzle_name: String,
    pub voice_room: Option<String>,
}

impl VoiceRoomFields {
    pub fn of(puzzle: &Puzzle) -> Self {
        Self {
            puzzle_name: puzzle.name.clone(),
            voice_room: puzzle.voice_room.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryFields {
    pub round_name: String,
    pub category: Option<String>,
}

impl CategoryFields {
    pub fn of(round: &Round) -> Self {
        Self {
            round_name: round.name.clone(),
            category: round.category.as_assigned().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderFields {
    pub round_name: String,
    pub folder: Option<String>,
}

impl FolderFields {
    pub fn of(round: &Round) -> Self {
        Self {
            round_name: round.name.clone(),
            folder: round.folder.as_assigned().map(str::to_string),
        }
    }
}

/// Compare the projections of a before/after pair. A missing `before`
/// (creation) is always stale.
pub fn is_stale<T, P: PartialEq>(before: Option<&T>, after: &T, project: impl Fn(&T) -> P) -> bool {
    match before {
        None => true,
        Some(before) => project(before) != project(after),
    }
}

pub const SOLVED_PREFIX: &str = "✅ ";

fn solved_title(name: &str, solved: bool) -> String {
    if solved {
        format!("{}{}", SOLVED_PREFIX, name)
    } else {
        name.to_string()
    }
}

/// Which archive category a solved puzzle's channel belongs in. Channel ids
/// are not uniformly random, so they are hashed first.
pub fn archive_index(channel: &str, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let digest = Sha256::digest(channel.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % count as u64) as usize
}

/// Name of the `index`th archive category: "Solved A" through "Solved Z",
/// then "Solved AA", "Solved AB", ...
pub fn archive_category_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    let suffix: String = letters.into_iter().rev().collect();
    format!("Solved {}", suffix)
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
