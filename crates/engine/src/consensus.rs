// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Round-creation consensus
//!
//! Discovery proposes a round by posting a notice in the quartermaster
//! channel. Once someone reacts with an emoji, a timer is armed for the
//! quiet period; removing the reaction cancels it. When the timer elapses
//! and an emoji is still present, the round is created with it and the
//! proposal's puzzles are added.

use crate::config::EngineConfig;
use crate::error::ConsensusError;
use huntsync_adapters::{ChatAdapter, ChatError};
use huntsync_core::{
    Clock, NoticeTarget, ProposedPuzzle, ProposedRound, PuzzleDraft, Round, RoundDraft,
    SystemClock,
};
use huntsync_storage::RecordStore;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

/// Result of proposing a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposeOutcome {
    /// Notice posted and proposal persisted
    Posted { message_id: String },
    AlreadyPending,
    RoundExists,
    DiscoveryDisabled,
    /// Part of a burst larger than `max_new_rounds`
    TooMany,
}

/// What a signal change did to a proposal's timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Armed,
    Cancelled,
    Unchanged,
    /// The message isn't a pending proposal
    Unknown,
}

/// Render the proposal notice, listing at most `limit` puzzles
pub fn proposal_notice(name: &str, puzzles: &[ProposedPuzzle], limit: usize) -> String {
    let mut text = format!("```*** ❓ NEW ROUND: \"{}\" ***\n\n", name);
    for (i, puzzle) in puzzles.iter().enumerate() {
        if i == limit {
            text.push_str(&format!("(...and more, {} in total...)\n\n", puzzles.len()));
            break;
        }
        text.push_str(&format!("{}\n{}\n\n", puzzle.name, puzzle.url));
    }
    text.push_str("Reminder: use `/qm discovery pause` to stop the bot.\n\n");
    text.push_str(">> REACT TO PROPOSE AN EMOJI FOR THIS ROUND <<\n```\n");
    text
}

/// An armed timer: dropping the sender cancels it. The generation tells a
/// timer apart from a later one armed for the same message.
struct Timer {
    generation: u64,
    cancel: oneshot::Sender<()>,
}

#[derive(Default)]
struct Timers {
    armed: HashMap<String, Timer>,
    next_generation: u64,
}

#[derive(Clone)]
pub struct RoundConsensus<C, K = SystemClock> {
    store: RecordStore,
    chat: C,
    clock: K,
    config: EngineConfig,
    timers: Arc<Mutex<Timers>>,
    /// Serialises signal handling with commits
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl<C: ChatAdapter, K: Clock> RoundConsensus<C, K> {
    pub fn new(store: RecordStore, chat: C, clock: K, config: EngineConfig) -> Self {
        Self {
            store,
            chat,
            clock,
            config,
            timers: Arc::new(Mutex::new(Timers::default())),
            gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn timers(&self) -> MutexGuard<'_, Timers> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn qm(&self) -> &str {
        self.config.channels.resolve(&NoticeTarget::Qm)
    }

    /// Proposals awaiting an emoji
    pub fn pending(&self) -> Vec<ProposedRound> {
        self.store.round_proposals()
    }

    pub fn is_armed(&self, message_id: &str) -> bool {
        self.timers().armed.contains_key(message_id)
    }

    /// Post a notice for a newly discovered round and persist the proposal
    pub async fn propose(
        &self,
        name: &str,
        puzzles: Vec<ProposedPuzzle>,
    ) -> Result<ProposeOutcome, ConsensusError> {
        if !self.store.discovery_enabled() {
            return Ok(ProposeOutcome::DiscoveryDisabled);
        }
        let _gate = self.gate.lock().await;
        if self.store.find_round_by_name(name).is_some() {
            return Ok(ProposeOutcome::RoundExists);
        }
        let mut proposals = self.store.round_proposals();
        if proposals.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Ok(ProposeOutcome::AlreadyPending);
        }

        let text = proposal_notice(name, &puzzles, self.config.proposal_puzzle_limit);
        let message_id = self.chat.send_message(self.qm(), &text).await?;
        proposals.push(ProposedRound {
            message_id: message_id.clone(),
            name: name.to_string(),
            notified_at: self.clock.utc_now(),
            puzzles,
        });
        self.store.set_round_proposals(&proposals)?;
        tracing::info!(round = name, %message_id, "round proposed");
        Ok(ProposeOutcome::Posted { message_id })
    }

    /// Propose every round from one discovery pass. A burst larger than
    /// `max_new_rounds` is refused as a whole.
    pub async fn propose_all(
        &self,
        rounds: BTreeMap<String, Vec<ProposedPuzzle>>,
    ) -> Result<Vec<(String, ProposeOutcome)>, ConsensusError> {
        if rounds.len() > self.config.max_new_rounds {
            tracing::warn!(
                count = rounds.len(),
                max = self.config.max_new_rounds,
                "too many new rounds"
            );
            let text = format!(
                "```💥 Too many new rounds! Round creation paused, please contact #{}.\n```\n",
                self.config.channels.tech
            );
            self.chat.send_message(self.qm(), &text).await?;
            return Ok(rounds
                .into_keys()
                .map(|name| (name, ProposeOutcome::TooMany))
                .collect());
        }
        let mut outcomes = Vec::with_capacity(rounds.len());
        for (name, puzzles) in rounds {
            let outcome = self.propose(&name, puzzles).await?;
            outcomes.push((name, outcome));
        }
        Ok(outcomes)
    }

    /// Re-read the emoji on a proposal notice and arm or cancel its timer
    pub async fn signal_changed(&self, message_id: &str) -> Result<SignalOutcome, ConsensusError> {
        let _gate = self.gate.lock().await;
        let known = self
            .store
            .round_proposals()
            .iter()
            .any(|p| p.message_id == message_id);
        if !known {
            return Ok(SignalOutcome::Unknown);
        }
        let emoji = self.chat.top_reaction(self.qm(), message_id).await?;
        Ok(self.apply_signal(message_id, emoji.is_some()))
    }

    fn apply_signal(&self, message_id: &str, present: bool) -> SignalOutcome {
        let armed = self.is_armed(message_id);
        match (present, armed) {
            (true, false) => {
                self.arm(message_id);
                SignalOutcome::Armed
            }
            (false, true) => {
                self.timers().armed.remove(message_id);
                tracing::info!(%message_id, "round creation cancelled");
                SignalOutcome::Cancelled
            }
            _ => SignalOutcome::Unchanged,
        }
    }

    fn arm(&self, message_id: &str) {
        let (cancel, cancelled) = oneshot::channel();
        let generation = {
            let mut timers = self.timers();
            timers.next_generation += 1;
            let generation = timers.next_generation;
            timers.armed.insert(
                message_id.to_string(),
                Timer { generation, cancel },
            );
            generation
        };
        tracing::info!(%message_id, quiet_period = ?self.config.quiet_period, "round creation armed");

        let this = self.clone();
        let message_id = message_id.to_string();
        let quiet_period = self.config.quiet_period;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled => return,
                _ = tokio::time::sleep(quiet_period) => {}
            }
            match this.commit(&message_id, generation).await {
                Ok(Some(round)) => tracing::info!(round = %round.name, "round committed"),
                Ok(None) => {}
                Err(e) => tracing::error!(%message_id, error = %e, "round creation failed"),
            }
        });
    }

    /// Create the round once its timer has elapsed. The signal is checked
    /// again; a proposal whose emoji was withdrawn stays pending.
    ///
    /// The proposal is removed before anything is created, so a crash in
    /// between loses the proposal rather than creating the round twice.
    async fn commit(
        &self,
        message_id: &str,
        generation: u64,
    ) -> Result<Option<Round>, ConsensusError> {
        let _gate = self.gate.lock().await;
        {
            let mut timers = self.timers();
            match timers.armed.get(message_id) {
                Some(timer) if timer.generation == generation => {
                    timers.armed.remove(message_id);
                }
                _ => return Ok(None),
            }
        }

        let mut proposals = self.store.round_proposals();
        let Some(index) = proposals.iter().position(|p| p.message_id == message_id) else {
            return Ok(None);
        };
        let Some(emoji) = self.chat.top_reaction(self.qm(), message_id).await? else {
            tracing::info!(%message_id, "emoji withdrawn at deadline, round stays pending");
            return Ok(None);
        };

        let proposal = proposals.remove(index);
        self.store.set_round_proposals(&proposals)?;
        if let Some(existing) = self.store.find_round_by_name(&proposal.name) {
            tracing::info!(
                round = %existing.name,
                id = %existing.id,
                "round already exists, proposal dropped"
            );
            return Ok(None);
        }

        let round = self
            .store
            .create_round(RoundDraft::new(proposal.name.clone(), emoji))?;
        for puzzle in &proposal.puzzles {
            let draft = PuzzleDraft::new(puzzle.name.clone(), round.id, puzzle.url.clone());
            if let Err(e) = self.store.create_puzzle(draft) {
                tracing::warn!(puzzle = %puzzle.name, error = %e, "skipping proposed puzzle");
            }
        }
        Ok(Some(round))
    }

    /// Re-arm persisted proposals after a restart. Proposals whose notice
    /// is gone, or whose round now exists, are dropped. Returns how many
    /// timers were armed.
    pub async fn restore(&self) -> Result<usize, ConsensusError> {
        let _gate = self.gate.lock().await;
        let proposals = self.store.round_proposals();
        let mut kept = Vec::with_capacity(proposals.len());
        let mut armed = 0;
        for proposal in proposals {
            if self.store.find_round_by_name(&proposal.name).is_some() {
                tracing::info!(round = %proposal.name, "round already exists, dropping proposal");
                continue;
            }
            match self.chat.top_reaction(self.qm(), &proposal.message_id).await {
                Ok(emoji) => {
                    if self.apply_signal(&proposal.message_id, emoji.is_some())
                        == SignalOutcome::Armed
                    {
                        armed += 1;
                    }
                    kept.push(proposal);
                }
                Err(ChatError::NotFound(_)) => {
                    tracing::warn!(round = %proposal.name, "proposal notice deleted, dropping proposal");
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.store.set_round_proposals(&kept)?;
        Ok(armed)
    }

    /// Cancel every armed timer. Proposals stay persisted.
    pub fn cancel_all(&self) -> usize {
        let mut timers = self.timers();
        let count = timers.armed.len();
        timers.armed.clear();
        if count > 0 {
            tracing::info!(count, "cancelled pending round creation");
        }
        count
    }
}

#[cfg(test)]
#[path = "consensus_tests.rs"]
mod tests;
