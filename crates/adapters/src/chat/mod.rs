// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team chat adapters: channels, categories, pins, voice events, messages

mod noop;

pub use noop::NoOpChatAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ChatCall, FakeChannel, FakeChatAdapter, SentMessage};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use huntsync_core::ChannelOrder;
use std::collections::HashMap;
use thiserror::Error;

/// Description carried by every voice event the bot manages. Events without
/// it belong to humans and are left alone.
pub const MANAGED_EVENT_DESCRIPTION: &str = "🤖 Event managed by Huntbot";

/// Errors from chat operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The resource was deleted out from under us
    #[error("unknown resource: {0}")]
    NotFound(String),
    /// The resource exists but the request shape no longer fits it, e.g. a
    /// category handle that now points at a text channel
    #[error("invalid form body: {0}")]
    InvalidForm(String),
    #[error("rate limited on {resource} until {retry_after}")]
    RateLimited {
        resource: String,
        retry_after: DateTime<Utc>,
    },
    #[error("request failed: {0}")]
    Request(String),
}

impl ChatError {
    /// Structural errors mean the external resource is broken and should be
    /// re-created
    pub fn is_structural(&self) -> bool {
        matches!(self, ChatError::NotFound(_) | ChatError::InvalidForm(_))
    }
}

/// One field of a pinned message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Rich pinned message at the top of a puzzle channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedMessage {
    pub title: String,
    pub url: String,
    pub fields: Vec<PinField>,
}

impl PinnedMessage {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// A scheduled event attached to a voice room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceEvent {
    pub id: String,
    pub room: String,
    pub title: String,
    /// Created by the bot, so safe to retitle and delete
    pub managed: bool,
}

/// Adapter for the team chat system
#[async_trait]
pub trait ChatAdapter: Clone + Send + Sync + 'static {
    /// Create a text channel, optionally under a category. Returns its id.
    async fn create_channel(&self, name: &str, category: Option<&str>)
        -> Result<String, ChatError>;

    /// Create a category. Returns its id.
    async fn create_category(&self, name: &str) -> Result<String, ChatError>;

    /// Look up a category by exact name
    async fn find_category(&self, name: &str) -> Result<Option<String>, ChatError>;

    async fn channel_exists(&self, id: &str) -> Result<bool, ChatError>;

    /// Rename a channel or category. May block for a long time when the
    /// chat system is rate limiting renames.
    async fn set_channel_name(&self, id: &str, name: &str) -> Result<(), ChatError>;

    async fn set_channel_category(&self, id: &str, category: &str) -> Result<(), ChatError>;

    /// Current position of every channel and category, by id
    async fn channel_positions(&self) -> Result<HashMap<String, i64>, ChatError>;

    /// Apply a batch of repositions in one request
    async fn sort_channels(&self, orders: &[ChannelOrder]) -> Result<(), ChatError>;

    /// Create or edit the pinned message whose header is `header`
    async fn upsert_pin(
        &self,
        channel: &str,
        header: &str,
        pin: &PinnedMessage,
    ) -> Result<(), ChatError>;

    async fn list_voice_events(&self) -> Result<Vec<VoiceEvent>, ChatError>;

    /// Schedule a bot-managed event in a voice room. Returns its id.
    async fn create_voice_event(&self, room: &str, title: &str) -> Result<String, ChatError>;

    async fn update_voice_event(&self, id: &str, title: &str) -> Result<(), ChatError>;

    async fn delete_voice_event(&self, id: &str) -> Result<(), ChatError>;

    /// When the next request against `resource` may go out, if it is
    /// currently rate limited
    fn check_rate_limit(&self, resource: &str) -> Option<DateTime<Utc>>;

    /// Post a message. Returns its id.
    async fn send_message(&self, channel: &str, text: &str) -> Result<String, ChatError>;

    /// The reaction with the most votes on a message, if any
    async fn top_reaction(&self, channel: &str, message: &str)
        -> Result<Option<String>, ChatError>;
}
