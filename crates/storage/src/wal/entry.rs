// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL entry structure with checksum verification

use super::WalError;
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single entry in the write-ahead log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Monotonically increasing sequence number
    pub sequence: u64,
    /// Microseconds since Unix epoch
    pub timestamp_micros: u64,
    /// Identifies the process instance that wrote the entry
    pub machine_id: String,
    pub operation: Operation,
    /// CRC32 checksum of serialized operation
    pub checksum: u32,
}

impl WalEntry {
    pub fn new(sequence: u64, machine_id: &str, operation: Operation) -> Self {
        let checksum = Self::calculate_checksum(&operation);
        let timestamp_micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);

        Self {
            sequence,
            timestamp_micros,
            machine_id: machine_id.to_string(),
            operation,
            checksum,
        }
    }

    fn calculate_checksum(operation: &Operation) -> u32 {
        // Operation holds only strings, integers, maps and JSON values, so
        // serialization cannot fail
        let json = serde_json::to_string(operation).unwrap_or_default();
        crc32fast::hash(json.as_bytes())
    }

    /// Verify the checksum matches the operation
    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(&self.operation)
    }

    /// Serialize to one line of JSON
    pub fn to_line(&self) -> Result<String, WalError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> Result<Self, WalError> {
        Ok(serde_json::from_str(line)?)
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
