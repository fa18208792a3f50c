// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sort engine driver: plans against live positions and sends one batch

use huntsync_adapters::{ChatAdapter, ChatError};
use huntsync_core::sort::{plan_puzzles, plan_rounds, PuzzleSortFields, RoundSortFields};
use huntsync_core::{Puzzle, Round, SortPlan};
use huntsync_storage::RecordStore;
use std::sync::Arc;

/// Serialises resorts so two plans never interleave their batches
#[derive(Clone)]
pub struct Sorter<C> {
    chat: C,
    store: RecordStore,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<C: ChatAdapter> Sorter<C> {
    pub fn new(chat: C, store: RecordStore) -> Self {
        Self {
            chat,
            store,
            lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Position `target` among its round's puzzles. `target` may not be
    /// stored yet.
    pub async fn resort_puzzle(&self, target: &Puzzle) -> Result<i64, ChatError> {
        let _guard = self.lock.lock().await;
        let existing: Vec<PuzzleSortFields> = self
            .store
            .list_puzzles()
            .iter()
            .map(PuzzleSortFields::of)
            .collect();
        let current = self.chat.channel_positions().await?;
        let plan = plan_puzzles(&existing, &PuzzleSortFields::of(target), &current);
        self.apply(plan).await
    }

    /// Position `target` among the rounds, pinning `archives` after them
    pub async fn resort_round(&self, target: &Round, archives: &[String]) -> Result<i64, ChatError> {
        let _guard = self.lock.lock().await;
        let existing: Vec<RoundSortFields> = self
            .store
            .list_rounds()
            .iter()
            .map(RoundSortFields::of)
            .collect();
        let current = self.chat.channel_positions().await?;
        let plan = plan_rounds(&existing, &RoundSortFields::of(target), archives, &current);
        self.apply(plan).await
    }

    async fn apply(&self, plan: SortPlan) -> Result<i64, ChatError> {
        if !plan.orders.is_empty() {
            tracing::debug!(
                position = plan.position,
                moved = plan.orders.len(),
                "repositioning"
            );
            self.chat.sort_channels(&plan.orders).await?;
        }
        Ok(plan.position)
    }
}

#[cfg(test)]
#[path = "sorter_tests.rs"]
mod tests;
