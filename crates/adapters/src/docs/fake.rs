// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake docs adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DocsAdapter, DocsError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// Recorded docs call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocsCall {
    CreateSheet { name: String },
    CreateFolder { name: String },
    SetSheetTitle { id: String, title: String },
    SetSheetFolder { id: String, folder: String },
    SetFolderName { id: String, name: String },
}

/// Fake spreadsheet or folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeFile {
    pub name: String,
    pub parent: Option<String>,
    pub is_folder: bool,
}

#[derive(Default)]
struct DocsState {
    files: BTreeMap<String, FakeFile>,
    failures: HashMap<&'static str, VecDeque<DocsError>>,
    calls: Vec<DocsCall>,
    next_id: u64,
}

impl DocsState {
    fn take_failure(&mut self, op: &'static str) -> Result<(), DocsError> {
        match self.failures.get_mut(op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn create(&mut self, kind: &str, name: &str, is_folder: bool) -> String {
        self.next_id += 1;
        let id = format!("{}-{}", kind, self.next_id);
        self.files.insert(
            id.clone(),
            FakeFile {
                name: name.to_string(),
                parent: None,
                is_folder,
            },
        );
        id
    }

    fn file_mut(&mut self, id: &str, folder: bool) -> Result<&mut FakeFile, DocsError> {
        match self.files.get_mut(id) {
            Some(file) if file.is_folder == folder => Ok(file),
            _ => Err(DocsError::NotFound(id.to_string())),
        }
    }
}

/// Fake docs adapter for testing
#[derive(Clone, Default)]
pub struct FakeDocsAdapter {
    state: Arc<Mutex<DocsState>>,
}

impl FakeDocsAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DocsState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<DocsCall> {
        self.lock().calls.clone()
    }

    pub fn file(&self, id: &str) -> Option<FakeFile> {
        self.lock().files.get(id).cloned()
    }

    /// Simulate a human deleting a file
    pub fn delete_file(&self, id: &str) {
        self.lock().files.remove(id);
    }

    /// Make the next call to `op` (a trait method name) fail with `err`
    pub fn fail_next(&self, op: &'static str, err: DocsError) {
        self.lock().failures.entry(op).or_default().push_back(err);
    }
}

#[async_trait]
impl DocsAdapter for FakeDocsAdapter {
    async fn create_sheet(&self, name: &str) -> Result<String, DocsError> {
        let mut state = self.lock();
        state.calls.push(DocsCall::CreateSheet {
            name: name.to_string(),
        });
        state.take_failure("create_sheet")?;
        Ok(state.create("sheet", name, false))
    }

    async fn create_folder(&self, name: &str) -> Result<String, DocsError> {
        let mut state = self.lock();
        state.calls.push(DocsCall::CreateFolder {
            name: name.to_string(),
        });
        state.take_failure("create_folder")?;
        Ok(state.create("folder", name, true))
    }

    async fn set_sheet_title(&self, id: &str, title: &str) -> Result<(), DocsError> {
        let mut state = self.lock();
        state.calls.push(DocsCall::SetSheetTitle {
            id: id.to_string(),
            title: title.to_string(),
        });
        state.take_failure("set_sheet_title")?;
        state.file_mut(id, false)?.name = title.to_string();
        Ok(())
    }

    async fn set_sheet_folder(&self, id: &str, folder: &str) -> Result<(), DocsError> {
        let mut state = self.lock();
        state.calls.push(DocsCall::SetSheetFolder {
            id: id.to_string(),
            folder: folder.to_string(),
        });
        state.take_failure("set_sheet_folder")?;
        state.file_mut(folder, true)?;
        state.file_mut(id, false)?.parent = Some(folder.to_string());
        Ok(())
    }

    async fn set_folder_name(&self, id: &str, name: &str) -> Result<(), DocsError> {
        let mut state = self.lock();
        state.calls.push(DocsCall::SetFolderName {
            id: id.to_string(),
            name: name.to_string(),
        });
        state.take_failure("set_folder_name")?;
        state.file_mut(id, true)?.name = name.to_string();
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
