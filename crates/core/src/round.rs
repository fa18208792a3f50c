// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rounds: groups of puzzles sharing a chat category and document folder

use crate::handle::{Handle, HandleKind};
use crate::id::RoundId;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A stored round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub name: String,
    pub emoji: String,
    /// Display hue in degrees, `[0, 360)`
    pub hue: i64,
    /// Pinned ahead of every non-special round
    pub special: bool,
    pub sort: i64,
    #[serde(rename = "discord_category")]
    pub category: Handle,
    #[serde(rename = "drive_folder")]
    pub folder: Handle,
}

/// Input for creating a round; the store assigns the id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundDraft {
    pub name: String,
    pub emoji: String,
    pub hue: i64,
    pub special: bool,
    pub sort: i64,
    pub category: Handle,
    pub folder: Handle,
}

impl RoundDraft {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
            ..Self::default()
        }
    }

    pub fn into_round(self, id: RoundId) -> Round {
        Round {
            id,
            name: self.name,
            emoji: self.emoji,
            hue: self.hue,
            special: self.special,
            sort: self.sort,
            category: self.category,
            folder: self.folder,
        }
    }
}

impl Round {
    /// Check the round's own fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::required("name"));
        }
        validate_emoji(&self.emoji)?;
        if !(0..360).contains(&self.hue) {
            return Err(ValidationError::new("hue", "must be in the range [0, 360)"));
        }
        Ok(())
    }

    /// Name of the round's chat category
    pub fn category_name(&self) -> String {
        format!("{}{}", ROUND_CATEGORY_PREFIX, self.name)
    }

    pub fn handle(&self, kind: HandleKind) -> Option<&Handle> {
        match kind {
            HandleKind::Category => Some(&self.category),
            HandleKind::Folder => Some(&self.folder),
            HandleKind::Channel | HandleKind::Spreadsheet => None,
        }
    }

    pub fn handle_mut(&mut self, kind: HandleKind) -> Option<&mut Handle> {
        match kind {
            HandleKind::Category => Some(&mut self.category),
            HandleKind::Folder => Some(&mut self.folder),
            HandleKind::Channel | HandleKind::Spreadsheet => None,
        }
    }
}

pub const ROUND_CATEGORY_PREFIX: &str = "Round: ";

fn validate_emoji(emoji: &str) -> Result<(), ValidationError> {
    if emoji.is_empty() {
        return Err(ValidationError::required("emoji"));
    }
    if emoji.graphemes(true).count() != 1 {
        return Err(ValidationError::new(
            "emoji",
            "must be a single grapheme cluster",
        ));
    }
    if !has_emoji_presentation(emoji) {
        return Err(ValidationError::new("emoji", "is not an emoji"));
    }
    Ok(())
}

/// Approximates the Unicode Emoji_Presentation property: either an explicit
/// emoji variation selector, a regional-indicator flag, a keycap, or a first
/// code point from the pictographic blocks.
fn has_emoji_presentation(cluster: &str) -> bool {
    const VARIATION_SELECTOR_16: char = '\u{FE0F}';
    const KEYCAP: char = '\u{20E3}';

    if cluster.contains(VARIATION_SELECTOR_16) || cluster.contains(KEYCAP) {
        return true;
    }
    let Some(first) = cluster.chars().next() else {
        return false;
    };
    matches!(
        first as u32,
        0x1F1E6..=0x1F1FF   // regional indicators
        | 0x1F300..=0x1F5FF // misc symbols and pictographs
        | 0x1F600..=0x1F64F // emoticons
        | 0x1F680..=0x1F6FF // transport and map
        | 0x1F900..=0x1F9FF // supplemental symbols and pictographs
        | 0x1FA70..=0x1FAFF // symbols and pictographs extended-A
        | 0x2614..=0x2615
        | 0x2648..=0x2653
        | 0x267F | 0x2693 | 0x26A1 | 0x26AA..=0x26AB | 0x26BD..=0x26BE
        | 0x26C4..=0x26C5 | 0x26CE | 0x26D4 | 0x26EA | 0x26F2..=0x26F5
        | 0x26FA | 0x26FD | 0x2705 | 0x270A..=0x270B | 0x2728 | 0x274C
        | 0x274E | 0x2753..=0x2755 | 0x2757 | 0x2795..=0x2797 | 0x27B0
        | 0x27BF | 0x2B1B..=0x2B1C | 0x2B50 | 0x2B55
        | 0x231A..=0x231B | 0x23E9..=0x23EC | 0x23F0 | 0x23F3
        | 0x25FD..=0x25FE
    )
}

#[cfg(test)]
#[path = "round_tests.rs"]
mod tests;
