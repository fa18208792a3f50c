// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared-document adapters: spreadsheets and folders

mod noop;

pub use noop::NoOpDocsAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DocsCall, FakeDocsAdapter, FakeFile};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from document operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocsError {
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    Request(String),
}

impl DocsError {
    pub fn is_structural(&self) -> bool {
        matches!(self, DocsError::NotFound(_))
    }
}

/// Adapter for the shared-document system
#[async_trait]
pub trait DocsAdapter: Clone + Send + Sync + 'static {
    /// Create a spreadsheet. Returns its id.
    async fn create_sheet(&self, name: &str) -> Result<String, DocsError>;

    /// Create a folder. Returns its id.
    async fn create_folder(&self, name: &str) -> Result<String, DocsError>;

    async fn set_sheet_title(&self, id: &str, title: &str) -> Result<(), DocsError>;

    /// Move a spreadsheet into a folder
    async fn set_sheet_folder(&self, id: &str, folder: &str) -> Result<(), DocsError>;

    async fn set_folder_name(&self, id: &str, name: &str) -> Result<(), DocsError>;
}
