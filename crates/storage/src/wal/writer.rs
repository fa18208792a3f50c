// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL writer for durable append operations

use super::entry::WalEntry;
use super::WalError;
use crate::operation::Operation;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct WalWriter {
    path: PathBuf,
    file: File,
    next_sequence: u64,
    machine_id: String,
}

impl WalWriter {
    /// Open or create a WAL file for appending.
    ///
    /// `next_sequence` comes from replay; the caller is expected to have
    /// truncated any corrupted tail first.
    pub fn open(path: &Path, machine_id: &str, next_sequence: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_sequence,
            machine_id: machine_id.to_string(),
        })
    }

    /// Append an operation. It is durably persisted (fsync'd) before this
    /// returns. Returns the assigned sequence number.
    pub fn append(&mut self, operation: Operation) -> Result<u64, WalError> {
        let sequence = self.next_sequence;
        let entry = WalEntry::new(sequence, &self.machine_id, operation);
        let mut line = entry.to_line()?;
        line.push('\n');

        self.file.write_all(line.as_bytes())?;
        self.file.sync_all()?;

        self.next_sequence += 1;
        Ok(sequence)
    }

    /// Replace the whole log with `operations`. Written to a sibling file and
    /// renamed into place so a crash leaves either the old or the new log.
    pub fn rewrite(&mut self, operations: Vec<Operation>) -> Result<(), WalError> {
        let tmp_path = self.path.with_extension("jsonl.tmp");
        let count = operations.len() as u64;
        {
            let mut tmp = File::create(&tmp_path)?;
            for (sequence, operation) in operations.into_iter().enumerate() {
                let entry = WalEntry::new(sequence as u64, &self.machine_id, operation);
                tmp.write_all(entry.to_line()?.as_bytes())?;
                tmp.write_all(b"\n")?;
            }
            tmp.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.next_sequence = count;
        Ok(())
    }

    /// Next sequence number to be assigned
    pub fn sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Cut the file at `position`, dropping a corrupted tail
pub fn truncate(path: &Path, position: u64) -> Result<(), WalError> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(position)?;
    file.sync_all()?;
    tracing::info!(position, "WAL truncated at corruption point");
    Ok(())
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
