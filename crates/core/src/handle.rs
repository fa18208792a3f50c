// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External-system handles
//!
//! A handle names the resource an entity owns in an external system (a chat
//! channel, a spreadsheet, a folder). Persisted form is a plain string: `""`
//! for not-yet-created, `"-"` for intentionally absent, anything else is the
//! external id.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const ABSENT_MARKER: &str = "-";

/// Reference to a resource in an external system
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Handle {
    /// Not created yet; the reconciler provisions it on first need
    #[default]
    Unset,
    /// Deliberately has no external resource; never provisioned
    Absent,
    /// Points at a real external resource
    Assigned(String),
}

impl Handle {
    pub fn assigned(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.is_empty() {
            Handle::Unset
        } else {
            Handle::Assigned(id)
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Handle::Unset)
    }

    pub fn as_assigned(&self) -> Option<&str> {
        match self {
            Handle::Assigned(id) => Some(id),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` respects the handle lifecycle:
    /// handles may only leave the `Unset` state, never be overwritten.
    pub fn may_become(&self, next: &Handle) -> bool {
        self == next || self.is_unset()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Handle::Unset => "",
            Handle::Absent => ABSENT_MARKER,
            Handle::Assigned(id) => id,
        }
    }
}

impl From<&str> for Handle {
    fn from(value: &str) -> Self {
        match value {
            "" => Handle::Unset,
            ABSENT_MARKER => Handle::Absent,
            id => Handle::Assigned(id.to_string()),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Unset => write!(f, "<unset>"),
            Handle::Absent => write!(f, "<absent>"),
            Handle::Assigned(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for Handle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Handle::from(raw.as_str()))
    }
}

/// Which handle field of an entity is being addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    /// Puzzle chat channel
    Channel,
    /// Puzzle spreadsheet
    Spreadsheet,
    /// Round chat category
    Category,
    /// Round document folder
    Folder,
}

impl HandleKind {
    pub fn field_name(self) -> &'static str {
        match self {
            HandleKind::Channel => "discord_channel",
            HandleKind::Spreadsheet => "spreadsheet_id",
            HandleKind::Category => "discord_category",
            HandleKind::Folder => "drive_folder",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
