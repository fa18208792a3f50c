// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The record store: authoritative puzzles and rounds
//!
//! Every mutation runs validate, WAL append, apply, journal and bus publish
//! under one lock, so ChangeIds are assigned exactly once, without gaps, in
//! the order consumers see them. The lock is never held across network I/O.

use crate::changelog::DEFAULT_CHANGELOG_SIZE;
use crate::error::StoreError;
use crate::operation::Operation;
use crate::state::MaterializedState;
use crate::wal::{writer, WalReader, WalWriter};
use huntsync_core::{
    Change, ChangeBus, ChangeEvent, ChangeId, Completion, CompletionSignal, Handle, HandleKind,
    Puzzle, PuzzleDraft, PuzzleId, PuzzleRecord, Round, RoundDraft, RoundId, ValidationError,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

const WAL_FILE: &str = "wal.jsonl";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of trailing changes kept in the journal
    pub changelog_size: usize,
    /// Identifies this process in WAL entries
    pub machine_id: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            changelog_size: DEFAULT_CHANGELOG_SIZE,
            machine_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Result of a successful update
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation<T> {
    pub before: T,
    pub after: T,
    pub change_id: ChangeId,
}

struct Inner {
    state: MaterializedState,
    wal: WalWriter,
}

/// Single-writer store shared by every component. Cloning shares the store.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<Mutex<Inner>>,
    bus: ChangeBus,
    dir: PathBuf,
}

impl RecordStore {
    /// Open or create the store in `dir`, replaying its WAL.
    ///
    /// Each open starts a new sync epoch so ChangeIds keep increasing across
    /// restarts.
    pub fn open(dir: &Path, bus: ChangeBus, config: StoreConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        let wal_path = dir.join(WAL_FILE);

        let mut state = MaterializedState::new(config.changelog_size);
        let mut next_sequence = 0;
        let mut iter = WalReader::open_or_empty(&wal_path).entries()?;
        let mut corrupted = false;
        for entry in iter.by_ref() {
            match entry {
                Ok(entry) => {
                    state.apply(&entry.operation);
                    next_sequence = entry.sequence + 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stopping WAL replay at corrupted entry");
                    corrupted = true;
                    break;
                }
            }
        }
        if corrupted {
            writer::truncate(&wal_path, iter.last_valid_position())?;
        }

        let wal = WalWriter::open(&wal_path, &config.machine_id, next_sequence)?;
        let mut inner = Inner { state, wal };

        let epoch = inner
            .state
            .settings
            .get(crate::settings::SYNC_EPOCH)
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(0)
            + 1;
        let op = Operation::setting(crate::settings::SYNC_EPOCH, serde_json::json!(epoch));
        inner.wal.append(op.clone())?;
        inner.state.apply(&op);
        inner.state.last_change_id = inner.state.last_change_id.max(ChangeId::epoch_start(epoch));

        tracing::info!(
            dir = %dir.display(),
            epoch,
            puzzles = inner.state.puzzles.len(),
            rounds = inner.state.rounds.len(),
            "record store opened"
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
            bus,
            dir: dir.to_path_buf(),
        })
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Lock for a write. Once the bus has failed the store only serves
    /// reads; the next process replays the journal.
    fn write_lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let inner = self.lock();
        match self.bus.failure() {
            Some(err) => Err(StoreError::Halted(err)),
            None => Ok(inner),
        }
    }

    /// The bus failure that stopped writes, if any
    pub fn halted(&self) -> Option<huntsync_core::BusError> {
        self.bus.failure()
    }

    /// WAL, apply, journal, publish. Called with the lock held.
    fn commit(&self, inner: &mut Inner, event: ChangeEvent) -> Result<ChangeId, StoreError> {
        let change_id = event.change_id();
        let op = Operation::change(&event);
        inner.wal.append(op.clone())?;
        inner.state.apply(&op);
        tracing::debug!(%change_id, event = %event.name(), "change committed");
        self.bus.publish(&event)?;
        Ok(change_id)
    }

    /// Write a setting. Settings are durable but never published.
    pub(crate) fn put_setting_value(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut inner = self.write_lock()?;
        let op = Operation::setting(key, value);
        inner.wal.append(op.clone())?;
        inner.state.apply(&op);
        Ok(())
    }

    pub(crate) fn setting_value(&self, key: &str) -> Option<serde_json::Value> {
        self.lock().state.settings.get(key).cloned()
    }

    // Puzzles

    pub fn create_puzzle(&self, draft: PuzzleDraft) -> Result<Puzzle, StoreError> {
        let mut inner = self.write_lock()?;
        let mut record = draft.into_record(PuzzleId(0));
        record.validate()?;
        check_puzzle_references(&inner.state, &record)?;

        record.id = inner.state.allocate_puzzle_id();
        let round = round_of(&inner.state, &record)?;
        let puzzle = record.join(round);
        let change_id = inner.state.last_change_id.next();
        self.commit(
            &mut inner,
            Change::new(None, Some(puzzle.clone()), change_id).into(),
        )?;
        tracing::info!(id = %puzzle.id, name = %puzzle.name, "puzzle created");
        Ok(puzzle)
    }

    /// Read-modify-validate-write. The closure edits a copy of the stored
    /// row; nothing is written unless the whole result is valid and keeps
    /// every handle lifecycle rule.
    pub fn update_puzzle(
        &self,
        id: PuzzleId,
        mutate: impl FnOnce(&mut PuzzleRecord),
    ) -> Result<Mutation<Puzzle>, StoreError> {
        self.write_puzzle(id, mutate, WriteMode::Checked, None)
    }

    /// Like [`update_puzzle`](Self::update_puzzle), and also returns a
    /// receiver resolved once the reconciler has processed the change.
    pub fn update_puzzle_and_wait(
        &self,
        id: PuzzleId,
        mutate: impl FnOnce(&mut PuzzleRecord),
    ) -> Result<(Mutation<Puzzle>, oneshot::Receiver<Completion>), StoreError> {
        let (signal, rx) = CompletionSignal::new();
        let mutation = self.write_puzzle(id, mutate, WriteMode::Checked, Some(signal))?;
        Ok((mutation, rx))
    }

    /// Fill an unset handle. Fails with `HandleConflict` if it is already set.
    pub fn assign_puzzle_handle(
        &self,
        id: PuzzleId,
        kind: HandleKind,
        value: impl Into<String>,
    ) -> Result<Mutation<Puzzle>, StoreError> {
        let handle = Handle::assigned(value);
        self.write_puzzle(
            id,
            |record| {
                if let Some(slot) = record.handle_mut(kind) {
                    *slot = handle;
                }
            },
            WriteMode::Checked,
            None,
        )
    }

    /// Administrative compare-and-swap of a handle. Returns `None` without
    /// writing when the current handle isn't `expected`.
    pub fn replace_puzzle_handle(
        &self,
        id: PuzzleId,
        kind: HandleKind,
        expected: &Handle,
        replacement: Handle,
    ) -> Result<Option<Mutation<Puzzle>>, StoreError> {
        let mutation = self.write_puzzle(
            id,
            |record| {
                if let Some(slot) = record.handle_mut(kind) {
                    *slot = replacement;
                }
            },
            WriteMode::Replace {
                kind,
                expected: expected.clone(),
            },
            None,
        );
        match mutation {
            Ok(m) => Ok(Some(m)),
            Err(StoreError::HandleConflict { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_puzzle(
        &self,
        id: PuzzleId,
        mutate: impl FnOnce(&mut PuzzleRecord),
        mode: WriteMode,
        completion: Option<CompletionSignal>,
    ) -> Result<Mutation<Puzzle>, StoreError> {
        let mut inner = self.write_lock()?;
        let stored = inner
            .state
            .puzzles
            .get(&id)
            .cloned()
            .ok_or(StoreError::PuzzleNotFound(id))?;
        let before = stored.clone().join(round_of(&inner.state, &stored)?);

        let mut record = stored.clone();
        mutate(&mut record);
        if record.id != id {
            return Err(StoreError::IdentityChanged {
                kind: "puzzle",
                id: id.0,
            });
        }
        record.validate()?;
        check_puzzle_references(&inner.state, &record)?;
        for kind in [HandleKind::Channel, HandleKind::Spreadsheet] {
            if let (Some(from), Some(to)) = (stored.handle(kind), record.handle(kind)) {
                mode.check(kind, from, to)?;
            }
        }

        let after = record.clone().join(round_of(&inner.state, &record)?);
        let change_id = inner.state.last_change_id.next();
        let mut change = Change::new(Some(before.clone()), Some(after.clone()), change_id);
        if let Some(signal) = completion {
            change = change.with_completion(signal);
        }
        self.commit(&mut inner, change.into())?;
        Ok(Mutation {
            before,
            after,
            change_id,
        })
    }

    /// Remove a puzzle. External resources are left in place.
    pub fn delete_puzzle(&self, id: PuzzleId) -> Result<ChangeId, StoreError> {
        let mut inner = self.write_lock()?;
        let before = inner.state.puzzle(id).ok_or(StoreError::PuzzleNotFound(id))?;
        let change_id = inner.state.last_change_id.next();
        self.commit(&mut inner, Change::new(Some(before), None, change_id).into())?;
        tracing::info!(%id, "puzzle deleted");
        Ok(change_id)
    }

    pub fn get_puzzle(&self, id: PuzzleId) -> Result<Puzzle, StoreError> {
        self.lock()
            .state
            .puzzle(id)
            .ok_or(StoreError::PuzzleNotFound(id))
    }

    pub fn list_puzzles(&self) -> Vec<Puzzle> {
        self.lock().state.joined_puzzles()
    }

    pub fn find_puzzle_by_channel(&self, channel: &str) -> Option<Puzzle> {
        let inner = self.lock();
        let id = inner
            .state
            .puzzles
            .values()
            .find(|p| p.channel.as_assigned() == Some(channel))?
            .id;
        inner.state.puzzle(id)
    }

    /// Remove a voice room from every puzzle assigned to it, one change per
    /// affected puzzle
    pub fn clear_voice_room(&self, room: &str) -> Result<Vec<ChangeId>, StoreError> {
        let ids: Vec<PuzzleId> = {
            let inner = self.lock();
            inner
                .state
                .puzzles
                .values()
                .filter(|p| p.voice_room.as_deref() == Some(room))
                .map(|p| p.id)
                .collect()
        };
        let mut changes = Vec::with_capacity(ids.len());
        for id in ids {
            let mutation = self.update_puzzle(id, |p| {
                if p.voice_room.as_deref() == Some(room) {
                    p.voice_room = None;
                }
            })?;
            changes.push(mutation.change_id);
        }
        Ok(changes)
    }

    // Rounds

    pub fn create_round(&self, draft: RoundDraft) -> Result<Round, StoreError> {
        let mut inner = self.write_lock()?;
        let mut round = draft.into_round(RoundId(0));
        round.validate()?;

        round.id = inner.state.allocate_round_id();
        let change_id = inner.state.last_change_id.next();
        self.commit(
            &mut inner,
            Change::new(None, Some(round.clone()), change_id).into(),
        )?;
        tracing::info!(id = %round.id, name = %round.name, "round created");
        Ok(round)
    }

    pub fn update_round(
        &self,
        id: RoundId,
        mutate: impl FnOnce(&mut Round),
    ) -> Result<Mutation<Round>, StoreError> {
        self.write_round(id, mutate, WriteMode::Checked)
    }

    pub fn assign_round_handle(
        &self,
        id: RoundId,
        kind: HandleKind,
        value: impl Into<String>,
    ) -> Result<Mutation<Round>, StoreError> {
        let handle = Handle::assigned(value);
        self.write_round(
            id,
            |round| {
                if let Some(slot) = round.handle_mut(kind) {
                    *slot = handle;
                }
            },
            WriteMode::Checked,
        )
    }

    pub fn replace_round_handle(
        &self,
        id: RoundId,
        kind: HandleKind,
        expected: &Handle,
        replacement: Handle,
    ) -> Result<Option<Mutation<Round>>, StoreError> {
        let mutation = self.write_round(
            id,
            |round| {
                if let Some(slot) = round.handle_mut(kind) {
                    *slot = replacement;
                }
            },
            WriteMode::Replace {
                kind,
                expected: expected.clone(),
            },
        );
        match mutation {
            Ok(m) => Ok(Some(m)),
            Err(StoreError::HandleConflict { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_round(
        &self,
        id: RoundId,
        mutate: impl FnOnce(&mut Round),
        mode: WriteMode,
    ) -> Result<Mutation<Round>, StoreError> {
        let mut inner = self.write_lock()?;
        let before = inner
            .state
            .rounds
            .get(&id)
            .cloned()
            .ok_or(StoreError::RoundNotFound(id))?;

        let mut after = before.clone();
        mutate(&mut after);
        if after.id != id {
            return Err(StoreError::IdentityChanged {
                kind: "round",
                id: id.0,
            });
        }
        after.validate()?;
        for kind in [HandleKind::Category, HandleKind::Folder] {
            if let (Some(from), Some(to)) = (before.handle(kind), after.handle(kind)) {
                mode.check(kind, from, to)?;
            }
        }

        let change_id = inner.state.last_change_id.next();
        self.commit(
            &mut inner,
            Change::new(Some(before.clone()), Some(after.clone()), change_id).into(),
        )?;
        Ok(Mutation {
            before,
            after,
            change_id,
        })
    }

    /// Remove a round. Rejected while any puzzle still belongs to it.
    pub fn delete_round(&self, id: RoundId) -> Result<ChangeId, StoreError> {
        let mut inner = self.write_lock()?;
        let before = inner
            .state
            .rounds
            .get(&id)
            .cloned()
            .ok_or(StoreError::RoundNotFound(id))?;
        if inner.state.puzzles.values().any(|p| p.round == id) {
            return Err(StoreError::RoundHasPuzzles(id));
        }
        let change_id = inner.state.last_change_id.next();
        self.commit(&mut inner, Change::new(Some(before), None, change_id).into())?;
        tracing::info!(%id, "round deleted");
        Ok(change_id)
    }

    pub fn get_round(&self, id: RoundId) -> Result<Round, StoreError> {
        self.lock()
            .state
            .rounds
            .get(&id)
            .cloned()
            .ok_or(StoreError::RoundNotFound(id))
    }

    pub fn list_rounds(&self) -> Vec<Round> {
        self.lock().state.rounds.values().cloned().collect()
    }

    /// Case-insensitive lookup by name
    pub fn find_round_by_name(&self, name: &str) -> Option<Round> {
        self.lock()
            .state
            .rounds
            .values()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    // Journal

    /// Journal entries newer than `after`, oldest first
    pub fn journal_since(&self, after: ChangeId) -> Vec<ChangeEvent> {
        self.lock().state.changelog.since(after)
    }

    pub fn last_change_id(&self) -> ChangeId {
        self.lock().state.last_change_id
    }

    /// Rewrite the WAL as a single snapshot of the current state
    pub fn compact(&self) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let snapshot = Operation::Snapshot(inner.state.snapshot());
        inner.wal.rewrite(vec![snapshot])?;
        tracing::info!(path = %inner.wal.path().display(), "WAL compacted");
        Ok(())
    }
}

/// How handle transitions are checked on write
enum WriteMode {
    /// Only unset handles may change
    Checked,
    /// One handle may move from `expected` to anything; the rest are checked
    Replace { kind: HandleKind, expected: Handle },
}

impl WriteMode {
    fn check(&self, kind: HandleKind, from: &Handle, to: &Handle) -> Result<(), StoreError> {
        let allowed = match self {
            WriteMode::Replace {
                kind: replaced,
                expected,
            } if *replaced == kind => from == expected,
            _ => from.may_become(to),
        };
        if allowed {
            Ok(())
        } else {
            Err(StoreError::HandleConflict {
                kind,
                from: from.clone(),
                to: to.clone(),
            })
        }
    }
}

fn round_of(state: &MaterializedState, record: &PuzzleRecord) -> Result<Round, StoreError> {
    state
        .rounds
        .get(&record.round)
        .cloned()
        .ok_or(StoreError::RoundNotFound(record.round))
}

/// Rules that need the rest of the store: the round exists and the channel
/// isn't used by another puzzle
fn check_puzzle_references(
    state: &MaterializedState,
    record: &PuzzleRecord,
) -> Result<(), ValidationError> {
    if !state.rounds.contains_key(&record.round) {
        return Err(ValidationError::new("round", "does not exist"));
    }
    if let Some(channel) = record.channel.as_assigned() {
        let taken = state
            .puzzles
            .values()
            .any(|p| p.id != record.id && p.channel.as_assigned() == Some(channel));
        if taken {
            return Err(ValidationError::new(
                HandleKind::Channel.field_name(),
                "is not unique",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
