// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pub/sub broadcast of sync messages

mod noop;

pub use noop::NoOpPublisher;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePublisher;

use async_trait::async_trait;
use huntsync_core::SyncMessage;
use thiserror::Error;

/// Errors from publishing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("publish failed: {0}")]
    Request(String),
}

impl PublishError {
    /// Nothing external can be re-created on a broadcast feed
    pub fn is_structural(&self) -> bool {
        false
    }
}

/// Adapter for the pub/sub feed that browser clients subscribe to
#[async_trait]
pub trait Publisher: Clone + Send + Sync + 'static {
    async fn publish(&self, message: &SyncMessage) -> Result<(), PublishError>;
}
