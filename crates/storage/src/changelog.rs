// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded journal of recent changes, keyed by ChangeId

use huntsync_core::{ChangeEvent, ChangeId};
use std::collections::VecDeque;

pub const DEFAULT_CHANGELOG_SIZE: usize = 128;

#[derive(Debug, Clone)]
pub struct Changelog {
    entries: VecDeque<ChangeEvent>,
    capacity: usize,
}

impl Default for Changelog {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGELOG_SIZE)
    }
}

impl Changelog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, pruning the oldest beyond capacity. Entries are
    /// stored without their completion signal.
    pub fn push(&mut self, event: &ChangeEvent) {
        self.entries.push_back(event.detached());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Entries with a ChangeId strictly greater than `after`, oldest first
    pub fn since(&self, after: ChangeId) -> Vec<ChangeEvent> {
        self.entries
            .iter()
            .filter(|e| e.change_id() > after)
            .cloned()
            .collect()
    }

    /// Oldest ChangeId still retained
    pub fn oldest(&self) -> Option<ChangeId> {
        self.entries.front().map(ChangeEvent::change_id)
    }

    pub fn latest(&self) -> Option<ChangeId> {
        self.entries.back().map(ChangeEvent::change_id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.entries.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "changelog_tests.rs"]
mod tests;
