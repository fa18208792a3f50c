// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed access to the settings table

use crate::error::StoreError;
use crate::store::RecordStore;
use chrono::{DateTime, Utc};
use huntsync_core::{ChangeId, ProposedRound};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DISCOVERY_ENABLED: &str = "discovery_enabled";
pub const ROUND_PROPOSALS: &str = "round_proposals";
pub const REMINDER_TIMESTAMP: &str = "reminder_timestamp";
pub const SYNC_EPOCH: &str = "sync_epoch";
pub const RECONCILED_THROUGH: &str = "reconciled_through";

impl RecordStore {
    /// Read a setting. A value that no longer parses reads as unset.
    pub fn setting<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.setting_value(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable setting");
                None
            }
        }
    }

    pub fn put_setting<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.put_setting_value(key, serde_json::to_value(value)?)
    }

    /// Whether discovery may propose new rounds. Defaults to enabled.
    pub fn discovery_enabled(&self) -> bool {
        self.setting(DISCOVERY_ENABLED).unwrap_or(true)
    }

    pub fn set_discovery_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.put_setting(DISCOVERY_ENABLED, &enabled)
    }

    /// Round proposals awaiting an emoji
    pub fn round_proposals(&self) -> Vec<ProposedRound> {
        self.setting(ROUND_PROPOSALS).unwrap_or_default()
    }

    pub fn set_round_proposals(&self, proposals: &[ProposedRound]) -> Result<(), StoreError> {
        self.put_setting(ROUND_PROPOSALS, &proposals)
    }

    pub fn reminder_timestamp(&self) -> Option<DateTime<Utc>> {
        self.setting(REMINDER_TIMESTAMP)
    }

    pub fn set_reminder_timestamp(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.put_setting(REMINDER_TIMESTAMP, &at)
    }

    pub fn sync_epoch(&self) -> i64 {
        self.setting(SYNC_EPOCH).unwrap_or(0)
    }

    /// Last ChangeId the reconciler finished. Changes after it are replayed
    /// on startup.
    pub fn reconciled_through(&self) -> ChangeId {
        self.setting(RECONCILED_THROUGH).unwrap_or_default()
    }

    /// Advance the reconciled watermark. Never moves backwards.
    pub fn set_reconciled_through(&self, id: ChangeId) -> Result<(), StoreError> {
        if id <= self.reconciled_through() {
            return Ok(());
        }
        self.put_setting(RECONCILED_THROUGH, &id)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
