// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed identifiers for stored entities and changes

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identity of a stored puzzle
    PuzzleId
);
define_id!(
    /// Identity of a stored round
    RoundId
);
define_id!(
    /// Position of a mutation in the change journal
    ChangeId
);

impl ChangeId {
    /// First change id of a sync epoch. Each process start opens a new epoch,
    /// so ids keep increasing across restarts without persisting the counter.
    pub fn epoch_start(epoch: i64) -> Self {
        Self(epoch << 32)
    }

    /// The id immediately after this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The sync epoch this id belongs to
    pub fn epoch(self) -> i64 {
        self.0 >> 32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_start_is_strictly_after_previous_epoch() {
        let last_of_first = ChangeId(ChangeId::epoch_start(2).0 + 10_000);
        assert!(ChangeId::epoch_start(3) > last_of_first);
        assert_eq!(ChangeId::epoch_start(3).epoch(), 3);
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&PuzzleId(42)).unwrap();
        assert_eq!(json, "42");
        let back: RoundId = serde_json::from_str("7").unwrap();
        assert_eq!(back, RoundId(7));
    }
}
