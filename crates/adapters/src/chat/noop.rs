// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op chat adapter for running without a chat connection.

use super::{ChatAdapter, ChatError, PinnedMessage, VoiceEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use huntsync_core::ChannelOrder;
use std::collections::HashMap;

/// Chat adapter that accepts everything and remembers nothing.
///
/// Created resources get placeholder ids so handles still leave `Unset`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpChatAdapter;

impl NoOpChatAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn placeholder(kind: &str) -> String {
    format!("noop-{}-{}", kind, uuid::Uuid::new_v4().simple())
}

#[async_trait]
impl ChatAdapter for NoOpChatAdapter {
    async fn create_channel(
        &self,
        _name: &str,
        _category: Option<&str>,
    ) -> Result<String, ChatError> {
        Ok(placeholder("channel"))
    }

    async fn create_category(&self, _name: &str) -> Result<String, ChatError> {
        Ok(placeholder("category"))
    }

    async fn find_category(&self, _name: &str) -> Result<Option<String>, ChatError> {
        Ok(None)
    }

    async fn channel_exists(&self, _id: &str) -> Result<bool, ChatError> {
        Ok(true)
    }

    async fn set_channel_name(&self, _id: &str, _name: &str) -> Result<(), ChatError> {
        Ok(())
    }

    async fn set_channel_category(&self, _id: &str, _category: &str) -> Result<(), ChatError> {
        Ok(())
    }

    async fn channel_positions(&self) -> Result<HashMap<String, i64>, ChatError> {
        Ok(HashMap::new())
    }

    async fn sort_channels(&self, _orders: &[ChannelOrder]) -> Result<(), ChatError> {
        Ok(())
    }

    async fn upsert_pin(
        &self,
        _channel: &str,
        _header: &str,
        _pin: &PinnedMessage,
    ) -> Result<(), ChatError> {
        Ok(())
    }

    async fn list_voice_events(&self) -> Result<Vec<VoiceEvent>, ChatError> {
        Ok(Vec::new())
    }

    async fn create_voice_event(&self, _room: &str, _title: &str) -> Result<String, ChatError> {
        Ok(placeholder("event"))
    }

    async fn update_voice_event(&self, _id: &str, _title: &str) -> Result<(), ChatError> {
        Ok(())
    }

    async fn delete_voice_event(&self, _id: &str) -> Result<(), ChatError> {
        Ok(())
    }

    fn check_rate_limit(&self, _resource: &str) -> Option<DateTime<Utc>> {
        None
    }

    async fn send_message(&self, _channel: &str, _text: &str) -> Result<String, ChatError> {
        Ok(placeholder("message"))
    }

    async fn top_reaction(
        &self,
        _channel: &str,
        _message: &str,
    ) -> Result<Option<String>, ChatError> {
        Ok(None)
    }
}
