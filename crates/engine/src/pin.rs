// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pinned puzzle information message

use huntsync_adapters::{PinField, PinnedMessage};
use huntsync_core::PinFields;

/// Header identifying the pin among a channel's pinned messages
pub const PIN_HEADER: &str = "Puzzle Information";

const NO_LOCATION: &str = "Use `/voice start` to assign a voice room";

pub fn spreadsheet_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}", id)
}

fn field(name: &str, value: impl Into<String>, inline: bool) -> PinField {
    PinField {
        name: name.to_string(),
        value: value.into(),
        inline,
    }
}

/// Render the pinned message for a puzzle
pub fn render(pin: &PinFields) -> PinnedMessage {
    let mut fields = vec![
        field(
            "Round",
            format!("{} {}", pin.round_emoji, pin.round_name),
            false,
        ),
        field("Status", pin.status.pretty(), true),
        field("Puzzle", format!("[Link]({})", pin.puzzle_url), true),
    ];
    if let Some(sheet) = &pin.spreadsheet {
        fields.push(field(
            "Sheet",
            format!("[Link]({})", spreadsheet_url(sheet)),
            true,
        ));
    }
    if !pin.note.is_empty() {
        fields.push(field("Note", pin.note.clone(), false));
    }
    if !pin.status.is_solved() {
        let location = match (&pin.voice_room, pin.location.is_empty()) {
            (Some(room), _) => format!("Join us in <#{}>!", room),
            (None, false) => format!("In-person in {}", pin.location),
            (None, true) => NO_LOCATION.to_string(),
        };
        fields.push(field("Location", location, false));
    }
    PinnedMessage {
        title: pin.puzzle_name.clone(),
        url: pin.puzzle_url.clone(),
        fields,
    }
}

#[cfg(test)]
#[path = "pin_tests.rs"]
mod tests;
