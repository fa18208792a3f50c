// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL reader for iterating and validating entries
//!
//! Invalid entries (checksum mismatch or parse errors) mark the truncation
//! point: nothing after the first one is trusted.

use super::entry::WalEntry;
use super::WalError;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::{Path, PathBuf};

pub struct WalReader {
    path: PathBuf,
}

impl WalReader {
    /// Create a reader; a missing file reads as empty
    pub fn open_or_empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Iterate over entries, yielding an error at the first corrupted one
    pub fn entries(&self) -> Result<WalEntryIter, WalError> {
        WalEntryIter::new(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Iterator over WAL entries with position tracking
pub struct WalEntryIter {
    reader: Option<BufReader<File>>,
    line_number: u64,
    /// Byte position after the last valid entry
    last_valid_position: u64,
}

impl WalEntryIter {
    fn new(path: &Path) -> Result<Self, WalError> {
        let reader = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            reader,
            line_number: 0,
            last_valid_position: 0,
        })
    }

    /// Byte position after the last successfully read valid entry. Truncating
    /// the file here drops a corrupted tail.
    pub fn last_valid_position(&self) -> u64 {
        self.last_valid_position
    }
}

impl Iterator for WalEntryIter {
    type Item = Result<WalEntry, WalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;

                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let entry = match WalEntry::from_line(trimmed) {
                        Ok(e) => e,
                        Err(e) => {
                            self.reader = None;
                            return Some(Err(WalError::Corrupted {
                                line: self.line_number,
                                reason: e.to_string(),
                            }));
                        }
                    };

                    if !entry.verify() {
                        self.reader = None;
                        return Some(Err(WalError::ChecksumMismatch {
                            line: self.line_number,
                        }));
                    }

                    // A valid line without its newline is a torn write
                    if !line.ends_with('\n') {
                        self.reader = None;
                        return Some(Err(WalError::Corrupted {
                            line: self.line_number,
                            reason: "missing line terminator".to_string(),
                        }));
                    }

                    self.last_valid_position =
                        reader.stream_position().unwrap_or(self.last_valid_position);
                    return Some(Ok(entry));
                }
                Err(e) => {
                    self.reader = None;
                    return Some(Err(WalError::Io(e)));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
