// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake chat adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ChatAdapter, ChatError, PinnedMessage, VoiceEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use huntsync_core::ChannelOrder;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Recorded chat call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    CreateChannel {
        name: String,
        category: Option<String>,
    },
    CreateCategory {
        name: String,
    },
    SetChannelName {
        id: String,
        name: String,
    },
    SetChannelCategory {
        id: String,
        category: String,
    },
    SortChannels {
        orders: Vec<ChannelOrder>,
    },
    UpsertPin {
        channel: String,
        header: String,
    },
    CreateVoiceEvent {
        room: String,
        title: String,
    },
    UpdateVoiceEvent {
        id: String,
        title: String,
    },
    DeleteVoiceEvent {
        id: String,
    },
    SendMessage {
        channel: String,
        text: String,
    },
}

/// Fake channel or category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeChannel {
    pub name: String,
    pub category: Option<String>,
    pub is_category: bool,
    pub position: i64,
}

/// Message posted through the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: String,
    pub channel: String,
    pub text: String,
}

#[derive(Default)]
struct ChatState {
    channels: BTreeMap<String, FakeChannel>,
    pins: HashMap<(String, String), PinnedMessage>,
    events: BTreeMap<String, VoiceEvent>,
    messages: Vec<SentMessage>,
    deleted_messages: HashSet<String>,
    reactions: HashMap<String, String>,
    failures: HashMap<&'static str, VecDeque<ChatError>>,
    rate_limits: HashMap<String, (DateTime<Utc>, Duration)>,
    calls: Vec<ChatCall>,
    next_id: u64,
}

impl ChatState {
    fn allocate(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", kind, self.next_id)
    }

    fn take_failure(&mut self, op: &'static str) -> Result<(), ChatError> {
        match self.failures.get_mut(op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn channel_mut(&mut self, id: &str) -> Result<&mut FakeChannel, ChatError> {
        self.channels
            .get_mut(id)
            .ok_or_else(|| ChatError::NotFound(id.to_string()))
    }

    fn require_category(&self, id: &str) -> Result<(), ChatError> {
        match self.channels.get(id) {
            Some(c) if c.is_category => Ok(()),
            Some(_) => Err(ChatError::InvalidForm(format!("{} is not a category", id))),
            None => Err(ChatError::NotFound(id.to_string())),
        }
    }
}

/// Fake chat adapter for testing
#[derive(Clone, Default)]
pub struct FakeChatAdapter {
    state: Arc<Mutex<ChatState>>,
}

impl FakeChatAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ChatCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn channel(&self, id: &str) -> Option<FakeChannel> {
        self.lock().channels.get(id).cloned()
    }

    /// Every live channel and category, by id
    pub fn channels(&self) -> BTreeMap<String, FakeChannel> {
        self.lock().channels.clone()
    }

    /// Simulate a human deleting a channel or category
    pub fn delete_channel(&self, id: &str) {
        self.lock().channels.remove(id);
    }

    pub fn set_position(&self, id: &str, position: i64) {
        if let Some(channel) = self.lock().channels.get_mut(id) {
            channel.position = position;
        }
    }

    pub fn pin(&self, channel: &str, header: &str) -> Option<PinnedMessage> {
        self.lock()
            .pins
            .get(&(channel.to_string(), header.to_string()))
            .cloned()
    }

    pub fn voice_events(&self) -> Vec<VoiceEvent> {
        self.lock().events.values().cloned().collect()
    }

    /// Add an event as if a human had scheduled it
    pub fn seed_voice_event(&self, room: &str, title: &str, managed: bool) -> String {
        let mut state = self.lock();
        let id = state.allocate("event");
        state.events.insert(
            id.clone(),
            VoiceEvent {
                id: id.clone(),
                room: room.to_string(),
                title: title.to_string(),
                managed,
            },
        );
        id
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.lock().messages.clone()
    }

    /// Texts posted to one channel, oldest first
    pub fn messages_to(&self, channel: &str) -> Vec<String> {
        self.lock()
            .messages
            .iter()
            .filter(|m| m.channel == channel)
            .map(|m| m.text.clone())
            .collect()
    }

    pub fn delete_message(&self, id: &str) {
        let mut state = self.lock();
        state.deleted_messages.insert(id.to_string());
        state.reactions.remove(id);
    }

    /// Set the most-voted reaction on a message
    pub fn set_reaction(&self, message: &str, emoji: &str) {
        self.lock()
            .reactions
            .insert(message.to_string(), emoji.to_string());
    }

    pub fn clear_reaction(&self, message: &str) {
        self.lock().reactions.remove(message);
    }

    /// Make the next call to `op` (a trait method name) fail with `err`
    pub fn fail_next(&self, op: &'static str, err: ChatError) {
        self.lock().failures.entry(op).or_default().push_back(err);
    }

    /// Rate limit renames of `resource`: the next rename blocks for `delay`
    /// while `check_rate_limit` reports `retry_after`
    pub fn rate_limit(&self, resource: &str, retry_after: DateTime<Utc>, delay: Duration) {
        self.lock()
            .rate_limits
            .insert(resource.to_string(), (retry_after, delay));
    }
}

#[async_trait]
impl ChatAdapter for FakeChatAdapter {
    async fn create_channel(
        &self,
        name: &str,
        category: Option<&str>,
    ) -> Result<String, ChatError> {
        let mut state = self.lock();
        state.calls.push(ChatCall::CreateChannel {
            name: name.to_string(),
            category: category.map(str::to_string),
        });
        state.take_failure("create_channel")?;
        if let Some(category) = category {
            state.require_category(category)?;
        }
        let id = state.allocate("chan");
        state.channels.insert(
            id.clone(),
            FakeChannel {
                name: name.to_string(),
                category: category.map(str::to_string),
                is_category: false,
                position: 0,
            },
        );
        Ok(id)
    }

    async fn create_category(&self, name: &str) -> Result<String, ChatError> {
        let mut state = self.lock();
        state.calls.push(ChatCall::CreateCategory {
            name: name.to_string(),
        });
        state.take_failure("create_category")?;
        let id = state.allocate("cat");
        state.channels.insert(
            id.clone(),
            FakeChannel {
                name: name.to_string(),
                category: None,
                is_category: true,
                position: 0,
            },
        );
        Ok(id)
    }

    async fn find_category(&self, name: &str) -> Result<Option<String>, ChatError> {
        let mut state = self.lock();
        state.take_failure("find_category")?;
        Ok(state
            .channels
            .iter()
            .find(|(_, c)| c.is_category && c.name == name)
            .map(|(id, _)| id.clone()))
    }

    async fn channel_exists(&self, id: &str) -> Result<bool, ChatError> {
        let mut state = self.lock();
        state.take_failure("channel_exists")?;
        Ok(state.channels.contains_key(id))
    }

    async fn set_channel_name(&self, id: &str, name: &str) -> Result<(), ChatError> {
        let limit = {
            let mut state = self.lock();
            state.calls.push(ChatCall::SetChannelName {
                id: id.to_string(),
                name: name.to_string(),
            });
            state.take_failure("set_channel_name")?;
            state.rate_limits.get(id).map(|(_, delay)| *delay)
        };
        if let Some(delay) = limit {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.lock();
        state.rate_limits.remove(id);
        state.channel_mut(id)?.name = name.to_string();
        Ok(())
    }

    async fn set_channel_category(&self, id: &str, category: &str) -> Result<(), ChatError> {
        let mut state = self.lock();
        state.calls.push(ChatCall::SetChannelCategory {
            id: id.to_string(),
            category: category.to_string(),
        });
        state.take_failure("set_channel_category")?;
        state.require_category(category)?;
        state.channel_mut(id)?.category = Some(category.to_string());
        Ok(())
    }

    async fn channel_positions(&self) -> Result<HashMap<String, i64>, ChatError> {
        let mut state = self.lock();
        state.take_failure("channel_positions")?;
        Ok(state
            .channels
            .iter()
            .map(|(id, c)| (id.clone(), c.position))
            .collect())
    }

    async fn sort_channels(&self, orders: &[ChannelOrder]) -> Result<(), ChatError> {
        let mut state = self.lock();
        state.calls.push(ChatCall::SortChannels {
            orders: orders.to_vec(),
        });
        state.take_failure("sort_channels")?;
        for order in orders {
            state.channel_mut(&order.id)?.position = order.position;
        }
        Ok(())
    }

    async fn upsert_pin(
        &self,
        channel: &str,
        header: &str,
        pin: &PinnedMessage,
    ) -> Result<(), ChatError> {
        let mut state = self.lock();
        state.calls.push(ChatCall::UpsertPin {
            channel: channel.to_string(),
            header: header.to_string(),
        });
        state.take_failure("upsert_pin")?;
        state.channel_mut(channel)?;
        state
            .pins
            .insert((channel.to_string(), header.to_string()), pin.clone());
        Ok(())
    }

    async fn list_voice_events(&self) -> Result<Vec<VoiceEvent>, ChatError> {
        let mut state = self.lock();
        state.take_failure("list_voice_events")?;
        Ok(state.events.values().cloned().collect())
    }

    async fn create_voice_event(&self, room: &str, title: &str) -> Result<String, ChatError> {
        let mut state = self.lock();
        state.calls.push(ChatCall::CreateVoiceEvent {
            room: room.to_string(),
            title: title.to_string(),
        });
        state.take_failure("create_voice_event")?;
        let id = state.allocate("event");
        state.events.insert(
            id.clone(),
            VoiceEvent {
                id: id.clone(),
                room: room.to_string(),
                title: title.to_string(),
                managed: true,
            },
        );
        Ok(id)
    }

    async fn update_voice_event(&self, id: &str, title: &str) -> Result<(), ChatError> {
        let mut state = self.lock();
        state.calls.push(ChatCall::UpdateVoiceEvent {
            id: id.to_string(),
            title: title.to_string(),
        });
        state.take_failure("update_voice_event")?;
        let event = state
            .events
            .get_mut(id)
            .ok_or_else(|| ChatError::NotFound(id.to_string()))?;
        event.title = title.to_string();
        Ok(())
    }

    async fn delete_voice_event(&self, id: &str) -> Result<(), ChatError> {
        let mut state = self.lock();
        state.calls.push(ChatCall::DeleteVoiceEvent { id: id.to_string() });
        state.take_failure("delete_voice_event")?;
        state
            .events
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ChatError::NotFound(id.to_string()))
    }

    fn check_rate_limit(&self, resource: &str) -> Option<DateTime<Utc>> {
        self.lock().rate_limits.get(resource).map(|(at, _)| *at)
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<String, ChatError> {
        let mut state = self.lock();
        state.calls.push(ChatCall::SendMessage {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        state.take_failure("send_message")?;
        let id = state.allocate("msg");
        state.messages.push(SentMessage {
            id: id.clone(),
            channel: channel.to_string(),
            text: text.to_string(),
        });
        Ok(id)
    }

    async fn top_reaction(
        &self,
        _channel: &str,
        message: &str,
    ) -> Result<Option<String>, ChatError> {
        let mut state = self.lock();
        state.take_failure("top_reaction")?;
        let exists = state.messages.iter().any(|m| m.id == message)
            && !state.deleted_messages.contains(message);
        if !exists {
            return Err(ChatError::NotFound(message.to_string()));
        }
        Ok(state.reactions.get(message).cloned())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
