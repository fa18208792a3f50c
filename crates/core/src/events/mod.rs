// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change bus for fanning store mutations out to independent consumers
//!
//! This module provides:
//! - `ChangeBus` - Bounded per-subscriber queues, delivered in change order
//! - `EventPattern` - Pattern matching for event subscriptions

mod bus;
mod subscription;

pub use bus::{BusError, ChangeBus, ChangeReceiver, QueueDepth, DEFAULT_QUEUE_CAPACITY};
pub use subscription::{EventPattern, SubscriberId, Subscription};
