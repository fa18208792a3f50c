// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound feeds: the pub/sub publisher and the in-process live relay

use huntsync_adapters::{PublishError, Publisher};
use huntsync_core::{ChangeEvent, ChangeId, SyncMessage};
use huntsync_storage::RecordStore;
use tokio::sync::broadcast;

/// Messages buffered per live session before it starts lagging
pub const DEFAULT_RELAY_CAPACITY: usize = 256;

/// Publish one change to the pub/sub feed. Failures are logged and
/// dropped; receivers re-sync on the next message for the entity.
pub async fn publish_change<P: Publisher>(
    publisher: &P,
    event: &ChangeEvent,
) -> Result<(), PublishError> {
    let message = SyncMessage::from(event);
    if let Err(e) = publisher.publish(&message).await {
        tracing::error!(change_id = %message.change_id, error = %e, "publish failed");
        return Err(e);
    }
    Ok(())
}

/// Fans sync messages out to live sessions.
///
/// A session that falls behind the buffer gets `RecvError::Lagged` and
/// should call [`LiveRelay::catch_up`] from the last id it saw.
#[derive(Clone)]
pub struct LiveRelay {
    tx: broadcast::Sender<SyncMessage>,
    store: RecordStore,
}

impl LiveRelay {
    pub fn new(store: RecordStore, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, store }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncMessage> {
        self.tx.subscribe()
    }

    /// Forward a change to every live session. Returns how many received it.
    pub fn send(&self, event: &ChangeEvent) -> usize {
        // No sessions is not an error
        self.tx.send(SyncMessage::from(event)).unwrap_or(0)
    }

    pub fn session_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Messages for every journaled change after `after`. Returns `None`
    /// when the journal no longer reaches back that far and the session
    /// must reload from a full snapshot.
    pub fn catch_up(&self, after: ChangeId) -> Option<Vec<SyncMessage>> {
        let events = self.store.journal_since(after);
        // Ids are consecutive within an epoch; a gap means the journal was
        // pruned past `after` or a restart started a new epoch
        let reaches = events
            .first()
            .map_or(true, |first| first.change_id() == after.next());
        if !reaches {
            tracing::debug!(%after, "journal no longer covers catch-up");
            return None;
        }
        Some(events.iter().map(SyncMessage::from).collect())
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
