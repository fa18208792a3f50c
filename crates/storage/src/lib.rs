// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! huntsync-storage: the durable record store
//!
//! - `RecordStore`: single-writer puzzles and rounds, publishing every
//!   mutation to the change bus
//! - WAL persistence with checksums and crash-tail truncation
//! - Bounded changelog journal and the settings table

pub mod changelog;
mod error;
pub mod operation;
pub mod settings;
pub mod state;
mod store;
pub mod wal;

pub use changelog::{Changelog, DEFAULT_CHANGELOG_SIZE};
pub use error::StoreError;
pub use operation::Operation;
pub use state::MaterializedState;
pub use store::{Mutation, RecordStore, StoreConfig};
