// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Puzzles: the unit of work being synchronized

use crate::handle::{Handle, HandleKind};
use crate::id::{PuzzleId, RoundId};
use crate::round::Round;
use crate::status::Status;
use crate::validation::{is_web_url, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A puzzle joined with a snapshot of its owning round. This is the shape
/// every reader and every change event sees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: PuzzleId,
    pub name: String,
    pub answer: String,
    pub round: Round,
    pub status: Status,
    pub note: String,
    pub location: String,
    pub puzzle_url: String,
    #[serde(rename = "spreadsheet_id")]
    pub spreadsheet: Handle,
    #[serde(rename = "discord_channel")]
    pub channel: Handle,
    pub meta: bool,
    #[serde(default)]
    pub voice_room: Option<String>,
    #[serde(default)]
    pub reminder: Option<DateTime<Utc>>,
}

/// The stored row: the round is referenced by id only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub id: PuzzleId,
    pub name: String,
    pub answer: String,
    pub round: RoundId,
    pub status: Status,
    pub note: String,
    pub location: String,
    pub puzzle_url: String,
    #[serde(rename = "spreadsheet_id")]
    pub spreadsheet: Handle,
    #[serde(rename = "discord_channel")]
    pub channel: Handle,
    pub meta: bool,
    #[serde(default)]
    pub voice_room: Option<String>,
    #[serde(default)]
    pub reminder: Option<DateTime<Utc>>,
}

/// Input for creating a puzzle; the store assigns the id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PuzzleDraft {
    pub name: String,
    pub answer: String,
    pub round: RoundId,
    pub status: Status,
    pub note: String,
    pub location: String,
    pub puzzle_url: String,
    pub spreadsheet: Handle,
    pub channel: Handle,
    pub meta: bool,
    pub voice_room: Option<String>,
    pub reminder: Option<DateTime<Utc>>,
}

impl PuzzleDraft {
    pub fn new(name: impl Into<String>, round: RoundId, puzzle_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            round,
            puzzle_url: puzzle_url.into(),
            ..Self::default()
        }
    }

    pub fn into_record(self, id: PuzzleId) -> PuzzleRecord {
        PuzzleRecord {
            id,
            name: self.name,
            answer: self.answer,
            round: self.round,
            status: self.status,
            note: self.note,
            location: self.location,
            puzzle_url: self.puzzle_url,
            spreadsheet: self.spreadsheet,
            channel: self.channel,
            meta: self.meta,
            voice_room: self.voice_room,
            reminder: self.reminder,
        }
    }
}

impl PuzzleRecord {
    /// Check the puzzle's own fields. Cross-entity rules (the round exists,
    /// the channel is unique) are enforced by the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::required("name"));
        }
        if self.round.0 == 0 {
            return Err(ValidationError::required("round"));
        }
        if self.puzzle_url.is_empty() {
            return Err(ValidationError::required("puzzle_url"));
        }
        if !is_web_url(&self.puzzle_url) {
            return Err(ValidationError::new("puzzle_url", "is not a valid URL"));
        }
        if !self.status.is_solved() && !self.answer.is_empty() {
            return Err(ValidationError::new(
                "status",
                "is unsolved but answer is not blank",
            ));
        }
        if self.status.is_solved() && self.answer.is_empty() {
            return Err(ValidationError::new("status", "is solved but answer is blank"));
        }
        Ok(())
    }

    pub fn join(self, round: Round) -> Puzzle {
        Puzzle {
            id: self.id,
            name: self.name,
            answer: self.answer,
            round,
            status: self.status,
            note: self.note,
            location: self.location,
            puzzle_url: self.puzzle_url,
            spreadsheet: self.spreadsheet,
            channel: self.channel,
            meta: self.meta,
            voice_room: self.voice_room,
            reminder: self.reminder,
        }
    }

    pub fn handle(&self, kind: HandleKind) -> Option<&Handle> {
        match kind {
            HandleKind::Channel => Some(&self.channel),
            HandleKind::Spreadsheet => Some(&self.spreadsheet),
            HandleKind::Category | HandleKind::Folder => None,
        }
    }

    pub fn handle_mut(&mut self, kind: HandleKind) -> Option<&mut Handle> {
        match kind {
            HandleKind::Channel => Some(&mut self.channel),
            HandleKind::Spreadsheet => Some(&mut self.spreadsheet),
            HandleKind::Category | HandleKind::Folder => None,
        }
    }
}

impl Puzzle {
    /// The stored row for this puzzle
    pub fn record(&self) -> PuzzleRecord {
        PuzzleRecord {
            id: self.id,
            name: self.name.clone(),
            answer: self.answer.clone(),
            round: self.round.id,
            status: self.status,
            note: self.note.clone(),
            location: self.location.clone(),
            puzzle_url: self.puzzle_url.clone(),
            spreadsheet: self.spreadsheet.clone(),
            channel: self.channel.clone(),
            meta: self.meta,
            voice_room: self.voice_room.clone(),
            reminder: self.reminder,
        }
    }

    /// Chat mention for the puzzle's channel, falling back to its bold name
    pub fn mention(&self) -> String {
        match self.channel.as_assigned() {
            Some(id) => format!("<#{}>", id),
            None => format!("**{}**", self.name),
        }
    }

    pub fn handle(&self, kind: HandleKind) -> Option<&Handle> {
        match kind {
            HandleKind::Channel => Some(&self.channel),
            HandleKind::Spreadsheet => Some(&self.spreadsheet),
            HandleKind::Category => Some(&self.round.category),
            HandleKind::Folder => Some(&self.round.folder),
        }
    }
}

#[cfg(test)]
#[path = "puzzle_tests.rs"]
mod tests;
