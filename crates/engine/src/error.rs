// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use huntsync_adapters::{ChatError, DocsError};
use huntsync_core::Facet;
use huntsync_storage::StoreError;
use thiserror::Error;

/// How a facet failure should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetErrorKind {
    /// The external resource is broken and could not be healed
    Structural,
    /// Anything else: reported, never retried
    Fatal,
}

/// Failure of one facet of a reconciliation. Other facets are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{facet} ({kind:?}): {message}")]
pub struct FacetError {
    pub facet: Facet,
    pub kind: FacetErrorKind,
    pub message: String,
}

impl FacetError {
    pub fn fatal(facet: Facet, message: impl Into<String>) -> Self {
        Self {
            facet,
            kind: FacetErrorKind::Fatal,
            message: message.into(),
        }
    }

    pub fn chat(facet: Facet, err: &ChatError) -> Self {
        let kind = if err.is_structural() {
            FacetErrorKind::Structural
        } else {
            FacetErrorKind::Fatal
        };
        Self {
            facet,
            kind,
            message: err.to_string(),
        }
    }

    pub fn docs(facet: Facet, err: &DocsError) -> Self {
        let kind = if err.is_structural() {
            FacetErrorKind::Structural
        } else {
            FacetErrorKind::Fatal
        };
        Self {
            facet,
            kind,
            message: err.to_string(),
        }
    }

    pub fn store(facet: Facet, err: &StoreError) -> Self {
        Self::fatal(facet, err.to_string())
    }

    pub fn is_structural(&self) -> bool {
        self.kind == FacetErrorKind::Structural
    }
}

fn describe(errors: &[FacetError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from reconciling one change
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("facets failed: {}", describe(.0))]
    Facets(Vec<FacetError>),
    #[error("provisioning {facet} failed: {message}")]
    Provision { facet: Facet, message: String },
    #[error("notification failed: {0}")]
    Notify(#[from] ChatError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ReconcileError {
    /// Failed facets, if this is a facet failure
    pub fn facets(&self) -> &[FacetError] {
        match self {
            ReconcileError::Facets(errors) => errors,
            _ => &[],
        }
    }
}

/// Errors from the round-creation workflow
#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("chat error: {0}")]
    Chat(#[from] ChatError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors starting or stopping the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("{0} task failed")]
    TaskFailed(String),
}
