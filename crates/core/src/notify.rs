// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status-transition notification rules
//!
//! Transitions are derived from a change's before/after pair only, so
//! replaying a change can never invent a transition the pair doesn't show.

use crate::change::Change;
use crate::puzzle::Puzzle;
use crate::status::Status;

/// A status transition worth announcing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The puzzle was just created and has a channel to point at
    Created,
    /// NotStarted to Working
    Started,
    /// Any unsolved state to any solved state
    Solved,
}

impl Transition {
    /// Detect the transition a puzzle change represents, if any. Deletions
    /// never announce.
    pub fn detect(change: &Change<Puzzle>) -> Option<Transition> {
        let after = change.after.as_ref()?;
        match &change.before {
            None => after.channel.as_assigned().map(|_| Transition::Created),
            Some(before) if !before.status.is_solved() && after.status.is_solved() => {
                Some(Transition::Solved)
            }
            Some(before)
                if before.status == Status::NotStarted
                    && after.status == Status::Working
                    && after.channel.as_assigned().is_some() =>
            {
                Some(Transition::Started)
            }
            Some(_) => None,
        }
    }

    /// Messages announcing this transition. `bot_triggered` suppresses the
    /// in-channel solve message, since the bot's own reply is already there.
    pub fn notices(self, puzzle: &Puzzle, bot_triggered: bool) -> Vec<Notice> {
        let emoji = &puzzle.round.emoji;
        match self {
            Transition::Created => vec![Notice::new(
                NoticeTarget::MoreEyes,
                format!("{} **New puzzle!** {}", emoji, puzzle.mention()),
            )],
            Transition::Started => vec![Notice::new(
                NoticeTarget::MoreEyes,
                format!("{} Work started on puzzle {}", emoji, puzzle.mention()),
            )],
            Transition::Solved => {
                let verb = puzzle.status.solved_verb().unwrap_or("solved");
                let mut notices = Vec::with_capacity(2);
                if let (false, Some(channel)) = (bot_triggered, puzzle.channel.as_assigned()) {
                    notices.push(Notice::new(
                        NoticeTarget::Channel(channel.to_string()),
                        format!(
                            "Puzzle {}! The answer was `{}`. I'll archive this channel.",
                            verb, puzzle.answer
                        ),
                    ));
                }
                notices.push(Notice::new(
                    NoticeTarget::HangingOut,
                    format!(
                        "{} Puzzle {} was **{}!** Answer: `{}`.",
                        emoji,
                        puzzle.mention(),
                        verb,
                        puzzle.answer
                    ),
                ));
                notices
            }
        }
    }
}

/// Where a notice goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeTarget {
    /// Channel for new and newly-worked puzzles
    MoreEyes,
    /// General announcement channel
    HangingOut,
    /// Quartermaster channel for operational alerts
    Qm,
    /// A specific chat channel
    Channel(String),
}

/// One outbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub target: NoticeTarget,
    pub text: String,
}

impl Notice {
    pub fn new(target: NoticeTarget, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
        }
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
