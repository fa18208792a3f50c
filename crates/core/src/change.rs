// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change events emitted by every store mutation

use crate::id::ChangeId;
use crate::puzzle::Puzzle;
use crate::round::Round;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Outcome reported back to a caller waiting on reconciliation
pub type Completion = Result<(), String>;

/// One-shot signal resolved once the reconciler has processed a change.
///
/// Clones share the sender; only the first `complete` call is delivered.
#[derive(Clone)]
pub struct CompletionSignal {
    tx: Arc<Mutex<Option<oneshot::Sender<Completion>>>>,
}

impl CompletionSignal {
    pub fn new() -> (Self, oneshot::Receiver<Completion>) {
        let (tx, rx) = oneshot::channel();
        let signal = Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        (signal, rx)
    }

    /// Deliver the outcome. Returns false if it was already delivered or the
    /// waiter has gone away.
    pub fn complete(&self, result: Completion) -> bool {
        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        match tx {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }
}

impl fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self
            .tx
            .lock()
            .map(|tx| tx.is_some())
            .unwrap_or(false);
        f.debug_struct("CompletionSignal")
            .field("pending", &pending)
            .finish()
    }
}

/// A before/after pair for one entity.
///
/// `before == None` is a creation, `after == None` is a deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change<T> {
    pub before: Option<T>,
    pub after: Option<T>,
    pub change_id: ChangeId,
    /// Present when the mutating caller is waiting on reconciliation.
    /// Never persisted.
    #[serde(skip)]
    pub completion: Option<CompletionSignal>,
}

impl<T> Change<T> {
    pub fn new(before: Option<T>, after: Option<T>, change_id: ChangeId) -> Self {
        Self {
            before,
            after,
            change_id,
            completion: None,
        }
    }

    pub fn with_completion(mut self, signal: CompletionSignal) -> Self {
        self.completion = Some(signal);
        self
    }

    pub fn is_creation(&self) -> bool {
        self.before.is_none()
    }

    pub fn is_deletion(&self) -> bool {
        self.after.is_none()
    }

    fn verb(&self) -> &'static str {
        match (&self.before, &self.after) {
            (None, _) => "created",
            (_, None) => "deleted",
            _ => "updated",
        }
    }
}

impl<T: PartialEq> PartialEq for Change<T> {
    fn eq(&self, other: &Self) -> bool {
        self.before == other.before
            && self.after == other.after
            && self.change_id == other.change_id
    }
}

/// Whether a change leaves the entity in place or removes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Upsert,
    Delete,
}

/// A change to either entity type, as carried by the bus and the journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum ChangeEvent {
    Puzzle(Change<Puzzle>),
    Round(Change<Round>),
}

impl ChangeEvent {
    pub fn change_id(&self) -> ChangeId {
        match self {
            ChangeEvent::Puzzle(c) => c.change_id,
            ChangeEvent::Round(c) => c.change_id,
        }
    }

    /// Event name for subscription matching, e.g. `puzzle:updated`
    pub fn name(&self) -> String {
        match self {
            ChangeEvent::Puzzle(c) => format!("puzzle:{}", c.verb()),
            ChangeEvent::Round(c) => format!("round:{}", c.verb()),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        let deleted = match self {
            ChangeEvent::Puzzle(c) => c.is_deletion(),
            ChangeEvent::Round(c) => c.is_deletion(),
        };
        if deleted {
            ChangeKind::Delete
        } else {
            ChangeKind::Upsert
        }
    }

    pub fn completion(&self) -> Option<&CompletionSignal> {
        match self {
            ChangeEvent::Puzzle(c) => c.completion.as_ref(),
            ChangeEvent::Round(c) => c.completion.as_ref(),
        }
    }

    /// Copy suitable for the journal: the completion signal stays with the
    /// live event only
    pub fn detached(&self) -> Self {
        match self {
            ChangeEvent::Puzzle(c) => ChangeEvent::Puzzle(Change::new(
                c.before.clone(),
                c.after.clone(),
                c.change_id,
            )),
            ChangeEvent::Round(c) => ChangeEvent::Round(Change::new(
                c.before.clone(),
                c.after.clone(),
                c.change_id,
            )),
        }
    }
}

impl From<Change<Puzzle>> for ChangeEvent {
    fn from(change: Change<Puzzle>) -> Self {
        ChangeEvent::Puzzle(change)
    }
}

impl From<Change<Round>> for ChangeEvent {
    fn from(change: Change<Round>) -> Self {
        ChangeEvent::Round(change)
    }
}

/// Wire form of a change for pub/sub and live clients. Receivers must be
/// idempotent on entity id and treat the latest message as authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMessage {
    pub change_id: ChangeId,
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puzzle: Option<Puzzle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<Round>,
}

impl From<&ChangeEvent> for SyncMessage {
    fn from(event: &ChangeEvent) -> Self {
        let (puzzle, round) = match event {
            ChangeEvent::Puzzle(c) => (c.after.clone().or_else(|| c.before.clone()), None),
            ChangeEvent::Round(c) => (None, c.after.clone().or_else(|| c.before.clone())),
        };
        SyncMessage {
            change_id: event.change_id(),
            kind: event.kind(),
            puzzle,
            round,
        }
    }
}

#[cfg(test)]
#[path = "change_tests.rs"]
mod tests;
