// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exactly-once status announcements

use super::Reconciler;
use crate::error::ReconcileError;
use crate::locks::EntityKey;
use huntsync_adapters::{ChatAdapter, DocsAdapter};
use huntsync_core::{Change, Clock, Puzzle, Transition};

impl<C, D, K> Reconciler<C, D, K>
where
    C: ChatAdapter,
    D: DocsAdapter,
    K: Clock,
{
    /// Announce the transition `change` represents. `current` supplies the
    /// channel provisioned for a new puzzle; status comes only from the
    /// change itself. Returns the number of messages sent.
    pub(super) async fn notify(
        &self,
        change: &Change<Puzzle>,
        current: &Puzzle,
    ) -> Result<usize, ReconcileError> {
        let Some(mut after) = change.after.clone() else {
            return Ok(0);
        };
        if change.change_id <= self.store.reconciled_through() {
            tracing::debug!("replayed change, not announcing");
            return Ok(0);
        }
        if after.channel.is_unset() {
            after.channel = current.channel.clone();
        }
        let detected = Change::new(change.before.clone(), Some(after), change.change_id);
        let Some(transition) = Transition::detect(&detected) else {
            return Ok(0);
        };

        {
            let mut notified = self.notified.lock().unwrap_or_else(|e| e.into_inner());
            let key = EntityKey::Puzzle(current.id);
            if notified.get(&key).is_some_and(|last| *last >= change.change_id) {
                tracing::debug!(?transition, "already announced");
                return Ok(0);
            }
            notified.insert(key, change.change_id);
        }

        let puzzle = detected.after.as_ref().unwrap_or(current);
        let notices = transition.notices(puzzle, change.completion.is_some());
        for notice in &notices {
            let channel = self.config.channels.resolve(&notice.target);
            self.chat.send_message(channel, &notice.text).await?;
        }
        tracing::info!(?transition, puzzle = %puzzle.name, sent = notices.len(), "announced");
        Ok(notices.len())
    }
}
