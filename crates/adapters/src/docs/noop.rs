// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op docs adapter for running without a document store.

use super::{DocsAdapter, DocsError};
use async_trait::async_trait;

/// Docs adapter that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpDocsAdapter;

impl NoOpDocsAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocsAdapter for NoOpDocsAdapter {
    async fn create_sheet(&self, _name: &str) -> Result<String, DocsError> {
        Ok(format!("noop-sheet-{}", uuid::Uuid::new_v4().simple()))
    }

    async fn create_folder(&self, _name: &str) -> Result<String, DocsError> {
        Ok(format!("noop-folder-{}", uuid::Uuid::new_v4().simple()))
    }

    async fn set_sheet_title(&self, _id: &str, _title: &str) -> Result<(), DocsError> {
        Ok(())
    }

    async fn set_sheet_folder(&self, _id: &str, _folder: &str) -> Result<(), DocsError> {
        Ok(())
    }

    async fn set_folder_name(&self, _id: &str, _name: &str) -> Result<(), DocsError> {
        Ok(())
    }
}
