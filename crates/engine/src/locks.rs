// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-(entity, facet) async locks serialising resource provisioning

use huntsync_core::{Facet, PuzzleId, RoundId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Entity whose external resources are being provisioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Puzzle(PuzzleId),
    Round(RoundId),
    /// The shared set of archive categories
    Archive,
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Puzzle(id) => write!(f, "puzzle:{}", id),
            EntityKey::Round(id) => write!(f, "round:{}", id),
            EntityKey::Archive => f.write_str("archive"),
        }
    }
}

type LockMap = HashMap<(EntityKey, Facet), Arc<tokio::sync::Mutex<()>>>;

/// Locks are created on first use and kept for the life of the process;
/// there are only a handful per entity.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<Mutex<LockMap>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, entity: EntityKey, facet: Facet) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry((entity, facet)).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
