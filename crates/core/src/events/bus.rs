// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change bus routing store mutations to subscribers

use super::subscription::{SubscriberId, Subscription};
use crate::change::ChangeEvent;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// Receiver for change delivery
pub type ChangeReceiver = mpsc::Receiver<ChangeEvent>;

/// Queue size used when none is configured
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Errors from publishing a change
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    /// A subscriber's queue is full. Changes are never dropped or reordered,
    /// so the bus stops delivering and the process must restart.
    #[error("subscriber {subscriber} queue is full ({capacity} pending changes)")]
    Backpressure { subscriber: String, capacity: usize },
}

/// Snapshot of one subscriber's queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDepth {
    pub subscriber: SubscriberId,
    pub depth: usize,
    pub capacity: usize,
}

impl QueueDepth {
    pub fn is_full(&self) -> bool {
        self.depth >= self.capacity
    }
}

/// The change bus gives each subscriber its own bounded queue so a slow
/// consumer cannot stall another. Within one queue, changes arrive in the
/// order they were published.
///
/// The first overflow latches the bus into a failed state: from then on
/// nothing is delivered, so every queue holds a gap-free prefix of the
/// changes and the journal covers the rest.
pub struct ChangeBus {
    subscribers: Arc<RwLock<HashMap<SubscriberId, (Subscription, mpsc::Sender<ChangeEvent>)>>>,
    capacity: usize,
    failure: Arc<watch::Sender<Option<BusError>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (failure, _) = watch::channel(None);
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
            failure: Arc::new(failure),
        }
    }

    /// The overflow that stopped the bus, if any
    pub fn failure(&self) -> Option<BusError> {
        self.failure.borrow().clone()
    }

    /// Resolves once the bus has failed
    pub async fn failed(&self) -> BusError {
        let mut rx = self.failure.subscribe();
        let failure = match rx.wait_for(Option::is_some).await {
            Ok(failure) => (*failure).clone(),
            Err(_) => None,
        };
        match failure {
            Some(err) => err,
            // The sender lives as long as `self`
            None => std::future::pending().await,
        }
    }

    fn fail(&self, subscriber: &SubscriberId, event: &ChangeEvent) -> BusError {
        tracing::error!(
            subscriber = %subscriber.0,
            change_id = %event.change_id(),
            capacity = self.capacity,
            "change bus queue full, delivery stopped"
        );
        let err = BusError::Backpressure {
            subscriber: subscriber.0.clone(),
            capacity: self.capacity,
        };
        self.failure.send_replace(Some(err.clone()));
        err
    }

    /// Subscribe to changes matching the given patterns
    pub fn subscribe(&self, subscription: Subscription) -> ChangeReceiver {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = subscription.id.clone();

        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.insert(id, (subscription, tx));

        rx
    }

    pub fn unsubscribe(&self, id: &SubscriberId) {
        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.remove(id);
    }

    /// Publish a change to all matching subscribers without blocking.
    ///
    /// Delivery is all or nothing: if any matching queue is full, no
    /// subscriber gets the change and the bus fails. Subscribers whose
    /// receiver was dropped are removed.
    pub fn publish(&self, event: &ChangeEvent) -> Result<usize, BusError> {
        if let Some(err) = self.failure() {
            return Err(err);
        }
        let event_name = event.name();
        let mut delivered = 0;
        let mut closed = Vec::new();

        {
            let subs = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
            let mut targets = Vec::new();
            for (id, (subscription, tx)) in subs.iter() {
                if !subscription.matches(&event_name) {
                    continue;
                }
                if tx.is_closed() {
                    closed.push(id.clone());
                } else if tx.capacity() == 0 {
                    return Err(self.fail(id, event));
                } else {
                    targets.push((id, tx));
                }
            }
            // Only the store publishes, under its lock, so room can only grow
            for (id, tx) in targets {
                match tx.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => return Err(self.fail(id, event)),
                    Err(mpsc::error::TrySendError::Closed(_)) => closed.push(id.clone()),
                }
            }
        }

        if !closed.is_empty() {
            let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
            for id in closed {
                tracing::warn!(subscriber = %id.0, "dropping closed subscriber");
                subs.remove(&id);
            }
        }

        Ok(delivered)
    }

    /// Current queue depth of every subscriber
    pub fn depths(&self) -> Vec<QueueDepth> {
        let subs = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
        let mut depths: Vec<_> = subs
            .iter()
            .map(|(id, (_, tx))| QueueDepth {
                subscriber: id.clone(),
                depth: self.capacity.saturating_sub(tx.capacity()),
                capacity: self.capacity,
            })
            .collect();
        depths.sort_by(|a, b| a.subscriber.0.cmp(&b.subscriber.0));
        depths
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ChangeBus {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            capacity: self.capacity,
            failure: Arc::clone(&self.failure),
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
