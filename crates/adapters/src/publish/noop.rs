// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op publisher for when broadcast is disabled.

use super::{PublishError, Publisher};
use async_trait::async_trait;
use huntsync_core::SyncMessage;

/// Publisher that drops every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpPublisher;

impl NoOpPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Publisher for NoOpPublisher {
    async fn publish(&self, _message: &SyncMessage) -> Result<(), PublishError> {
        Ok(())
    }
}
