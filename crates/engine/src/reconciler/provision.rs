// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lazy provisioning and self-healing of external resources
//!
//! Both paths take the keyed lock for the (entity, facet) pair and re-read
//! the store before touching the external system, so concurrent callers
//! create each resource once.

use super::{Failure, Reconciler};
use crate::error::ReconcileError;
use crate::locks::EntityKey;
use huntsync_adapters::{ChatAdapter, ChatError, DocsAdapter, DocsError};
use huntsync_core::projection::{archive_category_name, archive_index};
use huntsync_core::{
    ChannelFields, Clock, Facet, Handle, HandleKind, Puzzle, PuzzleId, Round, RoundId,
    SpreadsheetFields,
};

fn provision_error(facet: Facet, err: impl std::fmt::Display) -> ReconcileError {
    ReconcileError::Provision {
        facet,
        message: err.to_string(),
    }
}

impl<C, D, K> Reconciler<C, D, K>
where
    C: ChatAdapter,
    D: DocsAdapter,
    K: Clock,
{
    /// Create whatever `puzzle` still lacks: round category and folder
    /// first, then its channel and spreadsheet. Returns the refreshed puzzle
    /// and the facets whose resources were created here.
    pub(super) async fn provision_puzzle(
        &self,
        puzzle: &Puzzle,
    ) -> Result<(Puzzle, Vec<Facet>), ReconcileError> {
        let mut created = Vec::new();
        let current = self.store.get_puzzle(puzzle.id)?;
        if current.round.category.is_unset() && self.ensure_category(current.round.id).await? {
            created.push(Facet::Category);
        }
        if current.round.folder.is_unset() && self.ensure_folder(current.round.id).await? {
            created.push(Facet::Folder);
        }
        if current.channel.is_unset() && self.ensure_channel(current.id).await? {
            created.push(Facet::Channel);
        }
        if current.spreadsheet.is_unset() && self.ensure_sheet(current.id).await? {
            created.push(Facet::Spreadsheet);
        }
        let current = if created.is_empty() {
            current
        } else {
            self.store.get_puzzle(puzzle.id)?
        };
        Ok((current, created))
    }

    async fn ensure_category(&self, id: RoundId) -> Result<bool, ReconcileError> {
        let _guard = self.locks.acquire(EntityKey::Round(id), Facet::Category).await;
        let round = self.store.get_round(id)?;
        if !round.category.is_unset() {
            return Ok(false);
        }
        let category = self
            .chat
            .create_category(&round.category_name())
            .await
            .map_err(|e| provision_error(Facet::Category, e))?;
        self.store
            .assign_round_handle(id, HandleKind::Category, category)?;
        Ok(true)
    }

    async fn ensure_folder(&self, id: RoundId) -> Result<bool, ReconcileError> {
        let _guard = self.locks.acquire(EntityKey::Round(id), Facet::Folder).await;
        let round = self.store.get_round(id)?;
        if !round.folder.is_unset() {
            return Ok(false);
        }
        let folder = self
            .docs
            .create_folder(&round.name)
            .await
            .map_err(|e| provision_error(Facet::Folder, e))?;
        self.store.assign_round_handle(id, HandleKind::Folder, folder)?;
        Ok(true)
    }

    async fn ensure_channel(&self, id: PuzzleId) -> Result<bool, ReconcileError> {
        let _guard = self.locks.acquire(EntityKey::Puzzle(id), Facet::Channel).await;
        let puzzle = self.store.get_puzzle(id)?;
        if !puzzle.channel.is_unset() {
            return Ok(false);
        }
        let channel = self
            .create_channel(&puzzle)
            .await
            .map_err(|e| provision_error(Facet::Channel, e))?;
        self.store
            .assign_puzzle_handle(id, HandleKind::Channel, channel)?;
        Ok(true)
    }

    async fn ensure_sheet(&self, id: PuzzleId) -> Result<bool, ReconcileError> {
        let _guard = self
            .locks
            .acquire(EntityKey::Puzzle(id), Facet::Spreadsheet)
            .await;
        let puzzle = self.store.get_puzzle(id)?;
        if !puzzle.spreadsheet.is_unset() {
            return Ok(false);
        }
        let sheet = self
            .create_sheet(&puzzle)
            .await
            .map_err(|e| provision_error(Facet::Spreadsheet, e))?;
        self.store
            .assign_puzzle_handle(id, HandleKind::Spreadsheet, sheet)?;
        Ok(true)
    }

    /// New channel, named and placed as its facet would leave it
    async fn create_channel(&self, puzzle: &Puzzle) -> Result<String, ChatError> {
        let title = ChannelFields::of(puzzle).title();
        let channel = self
            .chat
            .create_channel(&title, puzzle.round.category.as_assigned())
            .await?;
        if puzzle.status.is_solved() {
            if let Some(archive) = self.archive_for(&channel).await? {
                self.chat.set_channel_category(&channel, &archive).await?;
            }
        }
        Ok(channel)
    }

    async fn create_sheet(&self, puzzle: &Puzzle) -> Result<String, DocsError> {
        let fields = SpreadsheetFields::of(puzzle);
        let sheet = self.docs.create_sheet(&fields.title()).await?;
        if let Some(folder) = &fields.round_folder {
            self.docs.set_sheet_folder(&sheet, folder).await?;
        }
        Ok(sheet)
    }

    /// Category a puzzle's channel belongs in: an archive once solved,
    /// otherwise the round's
    pub(super) async fn target_category(
        &self,
        puzzle: &Puzzle,
        channel: &str,
    ) -> Result<Option<String>, ChatError> {
        if puzzle.status.is_solved() {
            if let Some(archive) = self.archive_for(channel).await? {
                return Ok(Some(archive));
            }
        }
        Ok(puzzle.round.category.as_assigned().map(str::to_string))
    }

    async fn archive_for(&self, channel: &str) -> Result<Option<String>, ChatError> {
        let mut archives = self.archives();
        if archives.is_empty() && self.config.archive_count > 0 {
            archives = self.restore_archive_categories().await?;
        }
        if archives.is_empty() {
            return Ok(None);
        }
        Ok(Some(archives[archive_index(channel, archives.len())].clone()))
    }

    /// Archive category ids, as last restored
    pub fn archives(&self) -> Vec<String> {
        self.archives
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Find or create every archive category ("Solved A", "Solved B", ...)
    pub async fn restore_archive_categories(&self) -> Result<Vec<String>, ChatError> {
        let _guard = self.locks.acquire(EntityKey::Archive, Facet::Category).await;
        self.restore_archives_locked().await
    }

    async fn restore_archives_locked(&self) -> Result<Vec<String>, ChatError> {
        let mut archives = Vec::with_capacity(self.config.archive_count);
        for index in 0..self.config.archive_count {
            let name = archive_category_name(index);
            let id = match self.chat.find_category(&name).await? {
                Some(id) => id,
                None => {
                    tracing::info!(%name, "creating archive category");
                    self.chat.create_category(&name).await?
                }
            };
            archives.push(id);
        }
        *self.archives.lock().unwrap_or_else(|e| e.into_inner()) = archives.clone();
        Ok(archives)
    }

    /// Recreate whatever resource a structural failure points at. Returns
    /// whether anything was healed.
    pub(super) async fn heal_puzzle(
        &self,
        puzzle: &Puzzle,
        failure: &Failure,
    ) -> Result<bool, Failure> {
        match failure {
            Failure::Docs(DocsError::NotFound(id)) => {
                if puzzle.spreadsheet.as_assigned() == Some(id.as_str()) {
                    self.heal_sheet(puzzle).await
                } else if puzzle.round.folder.as_assigned() == Some(id.as_str()) {
                    self.heal_folder(&puzzle.round, puzzle.spreadsheet.as_assigned())
                        .await
                } else {
                    Ok(false)
                }
            }
            Failure::Chat(_) => {
                let mut healed = self.heal_category(&puzzle.round).await?;
                if puzzle.status.is_solved() {
                    healed |= self.heal_archives().await?;
                }
                healed |= self.heal_channel(puzzle).await?;
                Ok(healed)
            }
            _ => Ok(false),
        }
    }

    pub(super) async fn heal_round(&self, round: &Round, failure: &Failure) -> Result<bool, Failure> {
        match failure {
            Failure::Docs(DocsError::NotFound(id))
                if round.folder.as_assigned() == Some(id.as_str()) =>
            {
                self.heal_folder(round, None).await
            }
            Failure::Chat(_) => Ok(self.heal_category(round).await? | self.heal_archives().await?),
            _ => Ok(false),
        }
    }

    /// Replace the puzzle's channel if it no longer exists
    pub(super) async fn heal_channel(&self, puzzle: &Puzzle) -> Result<bool, Failure> {
        let Some(broken) = puzzle.channel.as_assigned() else {
            return Ok(false);
        };
        if self.chat.channel_exists(broken).await? {
            return Ok(false);
        }
        let _guard = self
            .locks
            .acquire(EntityKey::Puzzle(puzzle.id), Facet::Channel)
            .await;
        let current = self.store.get_puzzle(puzzle.id)?;
        if current.channel != puzzle.channel {
            return Ok(true);
        }
        let channel = self.create_channel(&current).await?;
        let replaced = self.store.replace_puzzle_handle(
            puzzle.id,
            HandleKind::Channel,
            &current.channel,
            Handle::assigned(channel.clone()),
        )?;
        match replaced {
            Some(_) => {
                tracing::warn!(puzzle = %current.name, %broken, %channel, "replaced deleted channel")
            }
            None => tracing::warn!(puzzle = %current.name, %channel, "created duplicate channel"),
        }
        Ok(true)
    }

    /// Replace the round's category if it no longer exists
    pub(super) async fn heal_category(&self, round: &Round) -> Result<bool, Failure> {
        let Some(broken) = round.category.as_assigned() else {
            return Ok(false);
        };
        if self.chat.channel_exists(broken).await? {
            return Ok(false);
        }
        let _guard = self
            .locks
            .acquire(EntityKey::Round(round.id), Facet::Category)
            .await;
        let current = self.store.get_round(round.id)?;
        if current.category != round.category {
            return Ok(true);
        }
        let category = self.chat.create_category(&current.category_name()).await?;
        let replaced = self.store.replace_round_handle(
            round.id,
            HandleKind::Category,
            &current.category,
            Handle::assigned(category.clone()),
        )?;
        match replaced {
            Some(_) => {
                tracing::warn!(round = %current.name, %broken, %category, "replaced deleted category")
            }
            None => tracing::warn!(round = %current.name, %category, "created duplicate category"),
        }
        Ok(true)
    }

    async fn heal_archives(&self) -> Result<bool, Failure> {
        let _guard = self.locks.acquire(EntityKey::Archive, Facet::Category).await;
        let mut missing = false;
        for id in self.archives() {
            if !self.chat.channel_exists(&id).await? {
                missing = true;
                break;
            }
        }
        if missing {
            tracing::warn!("archive category missing, restoring");
            self.restore_archives_locked().await?;
        }
        Ok(missing)
    }

    async fn heal_sheet(&self, puzzle: &Puzzle) -> Result<bool, Failure> {
        let _guard = self
            .locks
            .acquire(EntityKey::Puzzle(puzzle.id), Facet::Spreadsheet)
            .await;
        let current = self.store.get_puzzle(puzzle.id)?;
        if current.spreadsheet != puzzle.spreadsheet {
            return Ok(true);
        }
        let sheet = self.create_sheet(&current).await?;
        if self
            .store
            .replace_puzzle_handle(
                puzzle.id,
                HandleKind::Spreadsheet,
                &current.spreadsheet,
                Handle::assigned(sheet.clone()),
            )?
            .is_some()
        {
            tracing::warn!(puzzle = %current.name, %sheet, "replaced deleted spreadsheet");
        }
        Ok(true)
    }

    /// Replace the round's folder, moving `sheet` into whichever folder the
    /// round ends up with
    async fn heal_folder(&self, round: &Round, sheet: Option<&str>) -> Result<bool, Failure> {
        let _guard = self
            .locks
            .acquire(EntityKey::Round(round.id), Facet::Folder)
            .await;
        let current = self.store.get_round(round.id)?;
        let folder = match current.folder.as_assigned() {
            Some(folder) if current.folder != round.folder => folder.to_string(),
            _ => {
                let folder = self.docs.create_folder(&current.name).await?;
                if self
                    .store
                    .replace_round_handle(
                        round.id,
                        HandleKind::Folder,
                        &current.folder,
                        Handle::assigned(folder.clone()),
                    )?
                    .is_some()
                {
                    tracing::warn!(round = %current.name, %folder, "replaced deleted folder");
                }
                folder
            }
        };
        if let Some(sheet) = sheet {
            self.docs.set_sheet_folder(sheet, &folder).await?;
        }
        Ok(true)
    }
}
