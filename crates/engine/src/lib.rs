// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! huntsync-engine: propagates store changes to the external systems
//!
//! - `Reconciler`: lazy provisioning, concurrent facet updates, self-healing
//!   and status notifications
//! - `Sorter`: minimal channel repositioning
//! - `RoundConsensus`: emoji-vote round creation
//! - `Engine`: crash recovery and the consumer tasks

mod config;
mod consensus;
mod error;
mod locks;
pub mod pin;
mod reconciler;
mod relay;
mod runtime;
mod sorter;
mod voice;

pub use config::{ChannelNames, EngineConfig};
pub use consensus::{proposal_notice, ProposeOutcome, RoundConsensus, SignalOutcome};
pub use error::{ConsensusError, EngineError, FacetError, FacetErrorKind, ReconcileError};
pub use locks::{EntityKey, KeyedLocks};
pub use reconciler::{FacetReport, Outcome, Reconciler, SweepReport};
pub use relay::{publish_change, LiveRelay, DEFAULT_RELAY_CAPACITY};
pub use runtime::{Engine, EngineDeps};
pub use sorter::Sorter;
pub use voice::{event_title, VoiceReport, VoiceSync};
