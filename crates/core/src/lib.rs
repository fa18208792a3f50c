// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! huntsync-core: data model for the puzzle/round synchronization engine
//!
//! This crate provides:
//! - Puzzles, rounds, statuses and external handles, with validation
//! - `Change` events and the per-consumer `ChangeBus`
//! - Field projections describing each external facet
//! - Pure sort planning and status-transition notification rules

pub mod clock;
pub mod id;

pub mod events;

// Data model (order matters for dependencies)
pub mod handle;
pub mod status;
pub mod validation;
pub mod round;
pub mod puzzle;
pub mod proposal;
pub mod change;

pub mod notify;
pub mod projection;
pub mod sort;

// Re-exports
pub use change::{Change, ChangeEvent, ChangeKind, Completion, CompletionSignal, SyncMessage};
pub use clock::{Clock, FakeClock, SystemClock};
pub use events::{BusError, ChangeBus, ChangeReceiver, EventPattern, SubscriberId, Subscription};
pub use handle::{Handle, HandleKind};
pub use id::{ChangeId, PuzzleId, RoundId};
pub use notify::{Notice, NoticeTarget, Transition};
pub use projection::{
    CategoryFields, ChannelFields, Facet, FolderFields, PinFields, PuzzleFacet, RoundFacet,
    SpreadsheetFields, VoiceRoomFields,
};
pub use proposal::{ProposedPuzzle, ProposedRound};
pub use puzzle::{Puzzle, PuzzleDraft, PuzzleRecord};
pub use round::{Round, RoundDraft};
pub use sort::{ChannelOrder, SortPlan};
pub use status::Status;
pub use validation::ValidationError;
