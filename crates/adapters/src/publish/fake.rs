// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake publisher for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{PublishError, Publisher};
use async_trait::async_trait;
use huntsync_core::SyncMessage;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Fake publisher for testing
#[derive(Clone, Default)]
pub struct FakePublisher {
    published: Arc<Mutex<Vec<SyncMessage>>>,
    failures: Arc<Mutex<VecDeque<PublishError>>>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all published messages
    pub fn published(&self) -> Vec<SyncMessage> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Make the next publish fail with `err`
    pub fn fail_next(&self, err: PublishError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(err);
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn publish(&self, message: &SyncMessage) -> Result<(), PublishError> {
        if let Some(err) = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            return Err(err);
        }
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        Ok(())
    }
}
