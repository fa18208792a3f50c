// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciler: drives external systems toward the store's state
//!
//! Each change is handled in four steps:
//! 1. lazily provision missing resources (category, folder, channel, sheet)
//! 2. run every stale facet concurrently
//! 3. self-heal structural failures, collect the rest
//! 4. announce status transitions, once each

mod facets;
mod notify;
mod provision;

use crate::config::EngineConfig;
use crate::error::{FacetError, ReconcileError};
use crate::locks::{EntityKey, KeyedLocks};
use crate::sorter::Sorter;
use crate::voice::VoiceSync;
use huntsync_adapters::{ChatAdapter, ChatError, DocsAdapter, DocsError};
use huntsync_core::projection::is_stale;
use huntsync_core::sort::{PuzzleSortFields, RoundSortFields};
use huntsync_core::{
    Change, ChangeEvent, ChangeId, ChannelFields, Clock, Facet, PinFields, Puzzle, PuzzleFacet,
    Round, RoundFacet, SpreadsheetFields, SystemClock, VoiceRoomFields,
};
use huntsync_storage::{RecordStore, StoreError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::Instrument;

/// How a facet settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetReport {
    /// External state now matches
    Done,
    /// A rate-limited rename will finish in the background
    Deferred,
    /// The resource was missing and has been recreated
    Healed,
}

/// What reconciling one change did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Resources provisioned for the first time
    pub created: Vec<Facet>,
    pub facets: BTreeMap<Facet, FacetReport>,
    /// Notification messages sent
    pub notices: usize,
}

/// Counts from one structural sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub healed: usize,
}

/// Adapter or store failure inside a facet, before classification
#[derive(Debug)]
enum Failure {
    Chat(ChatError),
    Docs(DocsError),
    Store(StoreError),
}

impl From<ChatError> for Failure {
    fn from(err: ChatError) -> Self {
        Failure::Chat(err)
    }
}

impl From<DocsError> for Failure {
    fn from(err: DocsError) -> Self {
        Failure::Docs(err)
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        Failure::Store(err)
    }
}

impl Failure {
    fn is_structural(&self) -> bool {
        match self {
            Failure::Chat(e) => e.is_structural(),
            Failure::Docs(e) => e.is_structural(),
            Failure::Store(_) => false,
        }
    }

    fn into_facet_error(self, facet: Facet) -> FacetError {
        match self {
            Failure::Chat(e) => FacetError::chat(facet, &e),
            Failure::Docs(e) => FacetError::docs(facet, &e),
            Failure::Store(e) => FacetError::store(facet, &e),
        }
    }
}

type FacetResult = Result<FacetReport, Failure>;

/// The reconciler. Cloning shares locks, archive categories and
/// notification history.
#[derive(Clone)]
pub struct Reconciler<C, D, K = SystemClock> {
    store: RecordStore,
    chat: C,
    docs: D,
    clock: K,
    config: EngineConfig,
    locks: KeyedLocks,
    sorter: Sorter<C>,
    voice: VoiceSync<C>,
    /// Last ChangeId announced per entity
    notified: Arc<Mutex<HashMap<EntityKey, ChangeId>>>,
    /// Archive category ids, "Solved A" first
    archives: Arc<Mutex<Vec<String>>>,
}

impl<C, D, K> Reconciler<C, D, K>
where
    C: ChatAdapter,
    D: DocsAdapter,
    K: Clock,
{
    pub fn new(store: RecordStore, chat: C, docs: D, clock: K, config: EngineConfig) -> Self {
        Self {
            sorter: Sorter::new(chat.clone(), store.clone()),
            voice: VoiceSync::new(chat.clone(), store.clone()),
            store,
            chat,
            docs,
            clock,
            config,
            locks: KeyedLocks::new(),
            notified: Arc::new(Mutex::new(HashMap::new())),
            archives: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reconcile one change and resolve its completion signal, if any
    pub async fn reconcile(&self, event: &ChangeEvent) -> Result<Outcome, ReconcileError> {
        let span = tracing::info_span!(
            "reconcile",
            change_id = %event.change_id(),
            event = %event.name()
        );
        let result = async {
            let result = match event {
                ChangeEvent::Puzzle(change) => self.reconcile_puzzle(change).await,
                ChangeEvent::Round(change) => self.reconcile_round(change).await,
            };
            match &result {
                Ok(outcome) => tracing::debug!(
                    created = outcome.created.len(),
                    facets = outcome.facets.len(),
                    notices = outcome.notices,
                    "reconciled"
                ),
                Err(e) => tracing::error!(error = %e, "reconcile failed"),
            }
            result
        }
        .instrument(span)
        .await;

        if let Some(signal) = event.completion() {
            signal.complete(result.as_ref().map(|_| ()).map_err(ToString::to_string));
        }
        result
    }

    async fn reconcile_puzzle(&self, change: &Change<Puzzle>) -> Result<Outcome, ReconcileError> {
        let Some(after) = &change.after else {
            tracing::debug!("puzzle deleted, external resources left in place");
            return Ok(Outcome::default());
        };
        let (current, created) = match self.provision_puzzle(after).await {
            Err(ReconcileError::Store(StoreError::PuzzleNotFound(id))) => {
                tracing::debug!(%id, "puzzle deleted since this change");
                return Ok(Outcome::default());
            }
            result => result?,
        };

        let mut outcome = Outcome {
            created,
            ..Outcome::default()
        };
        let stale = puzzle_facets(change.before.as_ref(), after, &current, &outcome.created);
        let mut set = JoinSet::new();
        for &facet in &stale {
            let this = self.clone();
            let puzzle = current.clone();
            let span = tracing::info_span!("facet", %facet, puzzle = %puzzle.name);
            set.spawn(
                async move { (facet, this.run_puzzle_facet(facet, &puzzle).await) }
                    .instrument(span),
            );
        }

        let mut failures = Vec::new();
        for (facet, result) in settle(set, stale).await {
            match result {
                Ok(report) => {
                    outcome.facets.insert(facet, report);
                }
                Err(failure) if failure.is_structural() => {
                    match self.heal_puzzle(&current, &failure).await {
                        Ok(true) => {
                            outcome.facets.insert(facet, FacetReport::Healed);
                        }
                        Ok(false) => failures.push(failure.into_facet_error(facet)),
                        Err(heal) => {
                            tracing::error!(%facet, error = ?heal, "self-heal failed");
                            failures.push(failure.into_facet_error(facet));
                        }
                    }
                }
                Err(failure) => failures.push(failure.into_facet_error(facet)),
            }
        }
        if !failures.is_empty() {
            for failure in &failures {
                tracing::error!(facet = %failure.facet, error = %failure.message, "facet failed");
            }
            return Err(ReconcileError::Facets(failures));
        }

        outcome.notices = self.notify(change, &current).await?;
        Ok(outcome)
    }

    async fn reconcile_round(&self, change: &Change<Round>) -> Result<Outcome, ReconcileError> {
        let Some(after) = &change.after else {
            tracing::debug!("round deleted, external resources left in place");
            return Ok(Outcome::default());
        };
        let current = match self.store.get_round(after.id) {
            Err(StoreError::RoundNotFound(id)) => {
                tracing::debug!(%id, "round deleted since this change");
                return Ok(Outcome::default());
            }
            result => result?,
        };

        let stale = round_facets(change.before.as_ref(), after, &current);
        let mut set = JoinSet::new();
        for &facet in &stale {
            let this = self.clone();
            let before = change.before.clone();
            let round = current.clone();
            let span = tracing::info_span!("facet", %facet, round = %round.name);
            set.spawn(
                async move { (facet, this.run_round_facet(facet, before.as_ref(), &round).await) }
                    .instrument(span),
            );
        }

        let mut outcome = Outcome::default();
        let mut failures = Vec::new();
        for (facet, result) in settle(set, stale).await {
            match result {
                Ok(report) => {
                    outcome.facets.insert(facet, report);
                }
                Err(failure) if failure.is_structural() => {
                    match self.heal_round(&current, &failure).await {
                        Ok(true) => {
                            outcome.facets.insert(facet, FacetReport::Healed);
                        }
                        Ok(false) => failures.push(failure.into_facet_error(facet)),
                        Err(heal) => {
                            tracing::error!(%facet, error = ?heal, "self-heal failed");
                            failures.push(failure.into_facet_error(facet));
                        }
                    }
                }
                Err(failure) => failures.push(failure.into_facet_error(facet)),
            }
        }
        if failures.is_empty() {
            Ok(outcome)
        } else {
            for failure in &failures {
                tracing::error!(facet = %failure.facet, error = %failure.message, "facet failed");
            }
            Err(ReconcileError::Facets(failures))
        }
    }

    /// Check every assigned channel and round category, recreating the
    /// missing ones. Never announces anything.
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        for round in self.store.list_rounds() {
            report.checked += 1;
            match self.heal_category(&round).await {
                Ok(true) => report.healed += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(round = %round.name, error = ?e, "sweep check failed"),
            }
        }
        for puzzle in self.store.list_puzzles() {
            report.checked += 1;
            match self.heal_channel(&puzzle).await {
                Ok(true) => report.healed += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(puzzle = %puzzle.name, error = ?e, "sweep check failed"),
            }
        }
        if report.healed > 0 {
            tracing::info!(checked = report.checked, healed = report.healed, "sweep healed resources");
        }
        report
    }
}

/// Collect every spawned facet. A facet whose task panicked is reported as
/// fatal.
async fn settle<F>(
    mut set: JoinSet<(F, FacetResult)>,
    spawned: Vec<F>,
) -> Vec<(Facet, Result<FacetReport, Failure>)>
where
    F: Copy + Ord + Into<Facet> + Send + 'static,
{
    let mut pending: BTreeSet<F> = spawned.into_iter().collect();
    let mut results = Vec::with_capacity(pending.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((facet, result)) => {
                pending.remove(&facet);
                results.push((facet.into(), result));
            }
            Err(e) => tracing::error!(error = %e, "facet task failed"),
        }
    }
    for facet in pending {
        results.push((
            facet.into(),
            Err(Failure::Chat(ChatError::Request("facet task panicked".to_string()))),
        ));
    }
    results
}

/// Channel projection ignoring the channel's own handle: assigning a handle
/// to a freshly created channel is not a reason to rename it
fn channel_fields(puzzle: &Puzzle) -> ChannelFields {
    ChannelFields {
        channel: None,
        ..ChannelFields::of(puzzle)
    }
}

/// `before` with every handle that was only just assigned taken from
/// `after`. The pass that created the resource already ran the facets that
/// depend on it, so recording the handle needs no further calls. Replaced
/// handles still show up.
fn settled(before: &Puzzle, after: &Puzzle) -> Puzzle {
    let mut settled = before.clone();
    if settled.channel.is_unset() {
        settled.channel = after.channel.clone();
    }
    if settled.spreadsheet.is_unset() {
        settled.spreadsheet = after.spreadsheet.clone();
    }
    if settled.round.category.is_unset() {
        settled.round.category = after.round.category.clone();
    }
    if settled.round.folder.is_unset() {
        settled.round.folder = after.round.folder.clone();
    }
    settled
}

/// Stale puzzle facets, in dispatch order
fn puzzle_facets(
    before: Option<&Puzzle>,
    after: &Puzzle,
    current: &Puzzle,
    created: &[Facet],
) -> Vec<PuzzleFacet> {
    let settled = before.map(|b| settled(b, after));
    let before = settled.as_ref();
    let new_channel = created.contains(&Facet::Channel);
    let new_sheet = created.contains(&Facet::Spreadsheet);
    let has_channel = current.channel.as_assigned().is_some();

    let mut facets = Vec::new();
    if has_channel && !new_channel && is_stale(before, after, channel_fields) {
        facets.push(PuzzleFacet::Channel);
    }
    if has_channel && (new_channel || new_sheet || is_stale(before, after, PinFields::of)) {
        facets.push(PuzzleFacet::Pin);
    }
    if current.spreadsheet.as_assigned().is_some()
        && !new_sheet
        && is_stale(before, after, SpreadsheetFields::of)
    {
        facets.push(PuzzleFacet::Spreadsheet);
    }
    let in_voice = after.voice_room.is_some() || before.is_some_and(|b| b.voice_room.is_some());
    if in_voice && is_stale(before, after, VoiceRoomFields::of) {
        facets.push(PuzzleFacet::VoiceRoom);
    }
    if has_channel && (new_channel || is_stale(before, after, PuzzleSortFields::of)) {
        facets.push(PuzzleFacet::Position);
    }
    facets
}

/// Stale round facets. Renames only follow name changes; a handle that was
/// just assigned already carries the right name.
fn round_facets(before: Option<&Round>, after: &Round, current: &Round) -> Vec<RoundFacet> {
    let renamed = before.map_or(true, |b| b.name != after.name);
    let replaced = before.is_some_and(|b| {
        b.category.as_assigned().is_some() && b.category != after.category
    });
    let mut facets = Vec::new();
    if current.category.as_assigned().is_some() && (renamed || replaced) {
        facets.push(RoundFacet::Category);
    }
    if current.folder.as_assigned().is_some() && renamed {
        facets.push(RoundFacet::Folder);
    }
    if current.category.as_assigned().is_some() && is_stale(before, after, RoundSortFields::of) {
        facets.push(RoundFacet::Position);
    }
    facets
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
