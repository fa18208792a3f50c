// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::wal::WalError;
use huntsync_core::{BusError, Handle, HandleKind, PuzzleId, RoundId, ValidationError};
use thiserror::Error;

/// Errors from record store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad input; nothing was written
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("puzzle {0} not found")]
    PuzzleNotFound(PuzzleId),
    #[error("round {0} not found")]
    RoundNotFound(RoundId),
    #[error("cannot change the id of {kind} {id}")]
    IdentityChanged { kind: &'static str, id: i64 },
    /// Handles only move from unset to assigned outside the replace path
    #[error("{kind} cannot change from {from} to {to}")]
    HandleConflict {
        kind: HandleKind,
        from: Handle,
        to: Handle,
    },
    #[error("round {0} still has puzzles")]
    RoundHasPuzzles(RoundId),
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    /// The write is durable but a consumer queue overflowed; the store
    /// refuses every later write
    #[error("change bus error: {0}")]
    Bus(#[from] BusError),
    /// An earlier overflow stopped the store; nothing was written
    #[error("store halted after {0}")]
    Halted(BusError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when the caller sent bad input, as opposed to a storage failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_)
                | StoreError::IdentityChanged { .. }
                | StoreError::HandleConflict { .. }
                | StoreError::RoundHasPuzzles(_)
        )
    }
}
