// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::chat::{ChatAdapter, ChatError, PinnedMessage, VoiceEvent};
use crate::docs::{DocsAdapter, DocsError};
use crate::publish::{PublishError, Publisher};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use huntsync_core::{ChannelOrder, SyncMessage};
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;
use tracing::Instrument;

/// Run one adapter call inside `span`, logging its outcome and duration.
/// Writes log at info, reads at debug.
async fn traced<T, E, F>(span: tracing::Span, write: bool, call: F) -> Result<T, E>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    async move {
        let start = Instant::now();
        let result = call.await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) if write => tracing::info!(elapsed_ms, "done"),
            Ok(_) => tracing::debug!(elapsed_ms, "done"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
        }
        result
    }
    .instrument(span)
    .await
}

/// Wrapper that adds tracing to any ChatAdapter
#[derive(Clone)]
pub struct TracedChatAdapter<C> {
    inner: C,
}

impl<C> TracedChatAdapter<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: ChatAdapter> ChatAdapter for TracedChatAdapter<C> {
    async fn create_channel(
        &self,
        name: &str,
        category: Option<&str>,
    ) -> Result<String, ChatError> {
        let span = tracing::info_span!("chat.create_channel", name, category);
        let result = traced(span, true, self.inner.create_channel(name, category)).await;
        if let Ok(id) = &result {
            tracing::info!(name, channel = %id, "channel created");
        }
        result
    }

    async fn create_category(&self, name: &str) -> Result<String, ChatError> {
        let span = tracing::info_span!("chat.create_category", name);
        let result = traced(span, true, self.inner.create_category(name)).await;
        if let Ok(id) = &result {
            tracing::info!(name, category = %id, "category created");
        }
        result
    }

    async fn find_category(&self, name: &str) -> Result<Option<String>, ChatError> {
        let span = tracing::debug_span!("chat.find_category", name);
        traced(span, false, self.inner.find_category(name)).await
    }

    async fn channel_exists(&self, id: &str) -> Result<bool, ChatError> {
        let result = self.inner.channel_exists(id).await;
        tracing::trace!(id, exists = ?result.as_ref().ok(), "checked");
        result
    }

    async fn set_channel_name(&self, id: &str, name: &str) -> Result<(), ChatError> {
        let span = tracing::info_span!("chat.set_channel_name", id, name);
        traced(span, true, self.inner.set_channel_name(id, name)).await
    }

    async fn set_channel_category(&self, id: &str, category: &str) -> Result<(), ChatError> {
        let span = tracing::info_span!("chat.set_channel_category", id, category);
        traced(span, true, self.inner.set_channel_category(id, category)).await
    }

    async fn channel_positions(&self) -> Result<HashMap<String, i64>, ChatError> {
        let span = tracing::debug_span!("chat.channel_positions");
        traced(span, false, self.inner.channel_positions()).await
    }

    async fn sort_channels(&self, orders: &[ChannelOrder]) -> Result<(), ChatError> {
        let span = tracing::info_span!("chat.sort_channels", count = orders.len());
        traced(span, true, self.inner.sort_channels(orders)).await
    }

    async fn upsert_pin(
        &self,
        channel: &str,
        header: &str,
        pin: &PinnedMessage,
    ) -> Result<(), ChatError> {
        let span = tracing::info_span!("chat.upsert_pin", channel, title = %pin.title);
        traced(span, true, self.inner.upsert_pin(channel, header, pin)).await
    }

    async fn list_voice_events(&self) -> Result<Vec<VoiceEvent>, ChatError> {
        let span = tracing::debug_span!("chat.list_voice_events");
        traced(span, false, self.inner.list_voice_events()).await
    }

    async fn create_voice_event(&self, room: &str, title: &str) -> Result<String, ChatError> {
        let span = tracing::info_span!("chat.create_voice_event", room, title);
        traced(span, true, self.inner.create_voice_event(room, title)).await
    }

    async fn update_voice_event(&self, id: &str, title: &str) -> Result<(), ChatError> {
        let span = tracing::info_span!("chat.update_voice_event", id, title);
        traced(span, true, self.inner.update_voice_event(id, title)).await
    }

    async fn delete_voice_event(&self, id: &str) -> Result<(), ChatError> {
        let span = tracing::info_span!("chat.delete_voice_event", id);
        traced(span, true, self.inner.delete_voice_event(id)).await
    }

    fn check_rate_limit(&self, resource: &str) -> Option<DateTime<Utc>> {
        let retry_after = self.inner.check_rate_limit(resource);
        if let Some(at) = retry_after {
            tracing::warn!(resource, retry_after = %at, "rate limited");
        }
        retry_after
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<String, ChatError> {
        let span = tracing::info_span!("chat.send_message", channel);
        tracing::debug!(text_len = text.len(), "sending");
        traced(span, true, self.inner.send_message(channel, text)).await
    }

    async fn top_reaction(
        &self,
        channel: &str,
        message: &str,
    ) -> Result<Option<String>, ChatError> {
        let span = tracing::debug_span!("chat.top_reaction", channel, message);
        traced(span, false, self.inner.top_reaction(channel, message)).await
    }
}

/// Wrapper that adds tracing to any DocsAdapter
#[derive(Clone)]
pub struct TracedDocsAdapter<D> {
    inner: D,
}

impl<D> TracedDocsAdapter<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: DocsAdapter> DocsAdapter for TracedDocsAdapter<D> {
    async fn create_sheet(&self, name: &str) -> Result<String, DocsError> {
        let span = tracing::info_span!("docs.create_sheet", name);
        let result = traced(span, true, self.inner.create_sheet(name)).await;
        if let Ok(id) = &result {
            tracing::info!(name, sheet = %id, "spreadsheet created");
        }
        result
    }

    async fn create_folder(&self, name: &str) -> Result<String, DocsError> {
        let span = tracing::info_span!("docs.create_folder", name);
        let result = traced(span, true, self.inner.create_folder(name)).await;
        if let Ok(id) = &result {
            tracing::info!(name, folder = %id, "folder created");
        }
        result
    }

    async fn set_sheet_title(&self, id: &str, title: &str) -> Result<(), DocsError> {
        let span = tracing::info_span!("docs.set_sheet_title", id, title);
        traced(span, true, self.inner.set_sheet_title(id, title)).await
    }

    async fn set_sheet_folder(&self, id: &str, folder: &str) -> Result<(), DocsError> {
        let span = tracing::info_span!("docs.set_sheet_folder", id, folder);
        traced(span, true, self.inner.set_sheet_folder(id, folder)).await
    }

    async fn set_folder_name(&self, id: &str, name: &str) -> Result<(), DocsError> {
        let span = tracing::info_span!("docs.set_folder_name", id, name);
        traced(span, true, self.inner.set_folder_name(id, name)).await
    }
}

/// Wrapper that adds tracing to any Publisher
#[derive(Clone)]
pub struct TracedPublisher<P> {
    inner: P,
}

impl<P> TracedPublisher<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: Publisher> Publisher for TracedPublisher<P> {
    async fn publish(&self, message: &SyncMessage) -> Result<(), PublishError> {
        let span = tracing::debug_span!(
            "pubsub.publish",
            change_id = %message.change_id,
            kind = ?message.kind
        );
        traced(span, false, self.inner.publish(message)).await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
