// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-Ahead Log (WAL) module
//!
//! Append-only JSONL log of every state change. The WAL is the source of
//! truth: the store rebuilds its rows, settings and changelog by replaying it.
//!
//! ```text
//! Operation → WalEntry → WalWriter → disk (wal.jsonl)
//!                                         ↓
//!                               WalReader → replay → MaterializedState
//! ```
//!
//! - Every append is followed by `fsync()` before returning
//! - Checksums detect corruption from bit flips
//! - Replay stops at the first invalid entry; the tail is truncated before
//!   new entries are appended

pub mod entry;
pub mod reader;
pub mod writer;

pub use entry::WalEntry;
pub use reader::{WalEntryIter, WalReader};
pub use writer::WalWriter;

use thiserror::Error;

/// Errors that can occur reading or writing the WAL
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupted entry at line {line}: {reason}")]
    Corrupted { line: u64, reason: String },
    #[error("checksum mismatch at line {line}")]
    ChecksumMismatch { line: u64 },
}
