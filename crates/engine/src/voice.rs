// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduled voice events mirroring which puzzles are worked in which room

use huntsync_adapters::{ChatAdapter, ChatError};
use huntsync_storage::RecordStore;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Counts of event operations performed by one sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoiceReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl VoiceReport {
    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0
    }
}

/// Title of the event for a room: its puzzles' names, sorted
pub fn event_title(names: &[String]) -> String {
    let mut names = names.to_vec();
    names.sort();
    names.join(" & ")
}

#[derive(Clone)]
pub struct VoiceSync<C> {
    chat: C,
    store: RecordStore,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<C: ChatAdapter> VoiceSync<C> {
    pub fn new(chat: C, store: RecordStore) -> Self {
        Self {
            chat,
            store,
            lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Recompute every room's event from the store. Events scheduled by
    /// humans are left alone.
    pub async fn sync(&self) -> Result<VoiceReport, ChatError> {
        let _guard = self.lock.lock().await;

        let mut rooms: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for puzzle in self.store.list_puzzles() {
            if let Some(room) = puzzle.voice_room {
                rooms.entry(room).or_default().push(puzzle.name);
            }
        }
        let wanted: BTreeMap<String, String> = rooms
            .iter()
            .map(|(room, names)| (room.clone(), event_title(names)))
            .collect();

        let mut report = VoiceReport::default();
        let mut covered = HashSet::new();
        for event in self.chat.list_voice_events().await? {
            if !event.managed {
                continue;
            }
            match wanted.get(&event.room) {
                Some(title) if covered.insert(event.room.clone()) => {
                    if &event.title != title {
                        self.chat.update_voice_event(&event.id, title).await?;
                        report.updated += 1;
                    }
                }
                // Room emptied, or a duplicate event for a covered room
                _ => {
                    self.chat.delete_voice_event(&event.id).await?;
                    report.deleted += 1;
                }
            }
        }
        for (room, title) in &wanted {
            if !covered.contains(room) {
                self.chat.create_voice_event(room, title).await?;
                report.created += 1;
            }
        }

        if !report.is_empty() {
            tracing::info!(
                created = report.created,
                updated = report.updated,
                deleted = report.deleted,
                "voice events synced"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "voice_tests.rs"]
mod tests;
