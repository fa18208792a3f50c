// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! huntsyncd: configuration and lifecycle of the sync daemon

pub mod config;
pub mod lifecycle;

pub use config::{ConfigError, DaemonConfig, Paths};
pub use lifecycle::{startup, Daemon, LifecycleError};
