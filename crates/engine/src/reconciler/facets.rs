// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-facet repair actions

use super::{FacetReport, FacetResult, Failure, Reconciler};
use crate::pin::{self, PIN_HEADER};
use huntsync_adapters::{ChatAdapter, ChatError, DocsAdapter};
use huntsync_core::{
    ChannelFields, Clock, NoticeTarget, PinFields, Puzzle, PuzzleFacet, Round, RoundFacet,
    SpreadsheetFields,
};
use tokio::task::JoinHandle;

/// What a rename applies to, for the rate-limit notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RenameKind {
    Channel,
    Category,
}

impl RenameKind {
    fn noun(self) -> (&'static str, &'static str) {
        match self {
            RenameKind::Channel => ("channel", "Channel"),
            RenameKind::Category => ("category", "Category"),
        }
    }
}

/// Human-readable wait, formatted like "4m59s"
pub(super) fn format_wait(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (h, m, s) = (seconds / 3600, seconds % 3600 / 60, seconds % 60);
    if h > 0 {
        format!("{}h{}m{}s", h, m, s)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}

impl<C, D, K> Reconciler<C, D, K>
where
    C: ChatAdapter,
    D: DocsAdapter,
    K: Clock,
{
    pub(super) async fn run_puzzle_facet(
        &self,
        facet: PuzzleFacet,
        puzzle: &Puzzle,
    ) -> FacetResult {
        match facet {
            PuzzleFacet::Channel => self.sync_channel(puzzle).await,
            PuzzleFacet::Pin => self.sync_pin(puzzle).await,
            PuzzleFacet::Spreadsheet => self.sync_spreadsheet(puzzle).await,
            PuzzleFacet::VoiceRoom => {
                self.voice.sync().await?;
                Ok(FacetReport::Done)
            }
            PuzzleFacet::Position => {
                self.sorter.resort_puzzle(puzzle).await?;
                Ok(FacetReport::Done)
            }
        }
    }

    pub(super) async fn run_round_facet(
        &self,
        facet: RoundFacet,
        before: Option<&Round>,
        round: &Round,
    ) -> FacetResult {
        match facet {
            RoundFacet::Category => self.sync_category(before, round).await,
            RoundFacet::Folder => {
                if let Some(folder) = round.folder.as_assigned() {
                    self.docs.set_folder_name(folder, &round.name).await?;
                }
                Ok(FacetReport::Done)
            }
            RoundFacet::Position => {
                let archives = self.archives();
                self.sorter.resort_round(round, &archives).await?;
                Ok(FacetReport::Done)
            }
        }
    }

    /// Move the channel to its round or archive category, then rename it
    async fn sync_channel(&self, puzzle: &Puzzle) -> FacetResult {
        let Some(channel) = puzzle.channel.as_assigned() else {
            return Ok(FacetReport::Done);
        };
        if let Some(category) = self.target_category(puzzle, channel).await? {
            self.chat.set_channel_category(channel, &category).await?;
        }
        let title = ChannelFields::of(puzzle).title();
        Ok(self
            .rename_with_window(channel, &title, RenameKind::Channel)
            .await?)
    }

    async fn sync_pin(&self, puzzle: &Puzzle) -> FacetResult {
        let Some(channel) = puzzle.channel.as_assigned() else {
            return Ok(FacetReport::Done);
        };
        let message = pin::render(&PinFields::of(puzzle));
        self.chat.upsert_pin(channel, PIN_HEADER, &message).await?;
        Ok(FacetReport::Done)
    }

    async fn sync_spreadsheet(&self, puzzle: &Puzzle) -> FacetResult {
        let fields = SpreadsheetFields::of(puzzle);
        let Some(sheet) = &fields.spreadsheet else {
            return Ok(FacetReport::Done);
        };
        self.docs.set_sheet_title(sheet, &fields.title()).await?;
        if let Some(folder) = &fields.round_folder {
            self.docs.set_sheet_folder(sheet, folder).await?;
        }
        Ok(FacetReport::Done)
    }

    /// Rename the round's category. When the category itself was replaced,
    /// the round's unsolved channels follow it.
    async fn sync_category(&self, before: Option<&Round>, round: &Round) -> FacetResult {
        let Some(category) = round.category.as_assigned() else {
            return Ok(FacetReport::Done);
        };
        let replaced = before
            .and_then(|b| b.category.as_assigned())
            .is_some_and(|old| old != category);
        if replaced {
            self.reparent_channels(round, category).await?;
        }
        if before.is_some_and(|b| b.name == round.name) {
            return Ok(FacetReport::Done);
        }
        Ok(self
            .rename_with_window(category, &round.category_name(), RenameKind::Category)
            .await?)
    }

    async fn reparent_channels(&self, round: &Round, category: &str) -> Result<(), Failure> {
        let channels: Vec<String> = self
            .store
            .list_puzzles()
            .into_iter()
            .filter(|p| p.round.id == round.id && !p.status.is_solved())
            .filter_map(|p| p.channel.as_assigned().map(str::to_string))
            .collect();
        for channel in channels {
            match self.chat.set_channel_category(&channel, category).await {
                Ok(()) => {}
                // The channel's own facets heal it
                Err(ChatError::NotFound(_)) => {
                    tracing::warn!(%channel, "skipping missing channel while re-parenting")
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Rename a channel or category, waiting at most the rate-limit window
    /// before checking whether the chat system is holding the request back.
    /// A held-back rename finishes in the background.
    pub(super) async fn rename_with_window(
        &self,
        resource: &str,
        name: &str,
        kind: RenameKind,
    ) -> Result<FacetReport, ChatError> {
        let mut task: JoinHandle<Result<(), ChatError>> = {
            let chat = self.chat.clone();
            let resource = resource.to_string();
            let name = name.to_string();
            tokio::spawn(async move { chat.set_channel_name(&resource, &name).await })
        };
        loop {
            match tokio::time::timeout(self.config.rate_limit_window, &mut task).await {
                Ok(joined) => {
                    joined.map_err(|e| ChatError::Request(format!("rename task failed: {}", e)))??;
                    return Ok(FacetReport::Done);
                }
                Err(_) => {
                    let Some(retry_after) = self.chat.check_rate_limit(resource) else {
                        tracing::debug!(resource, "rename slow but not rate limited, waiting");
                        continue;
                    };
                    self.post_rate_limit_notice(resource, name, kind, retry_after)
                        .await;
                    let resource = resource.to_string();
                    tokio::spawn(async move {
                        match task.await {
                            Ok(Ok(())) => tracing::info!(%resource, "deferred rename finished"),
                            Ok(Err(e)) => {
                                tracing::error!(%resource, error = %e, "deferred rename failed")
                            }
                            Err(e) => {
                                tracing::error!(%resource, error = %e, "deferred rename task failed")
                            }
                        }
                    });
                    return Ok(FacetReport::Deferred);
                }
            }
        }
    }

    async fn post_rate_limit_notice(
        &self,
        resource: &str,
        name: &str,
        kind: RenameKind,
        retry_after: chrono::DateTime<chrono::Utc>,
    ) {
        let wait = retry_after - self.clock.utc_now();
        let seconds = (wait.num_milliseconds() + 500).div_euclid(1000);
        let (noun, title) = kind.noun();
        let text = format!(
            ":snail: Hit Discord's rate limit on {} renaming. {} will be renamed to {:?} in {}.",
            noun,
            title,
            name,
            format_wait(seconds)
        );
        let target = match kind {
            RenameKind::Channel => NoticeTarget::Channel(resource.to_string()),
            RenameKind::Category => NoticeTarget::Qm,
        };
        let channel = self.config.channels.resolve(&target);
        if let Err(e) = self.chat.send_message(channel, &text).await {
            tracing::warn!(channel, error = %e, "failed to post rate limit notice");
        }
    }
}
