// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine runtime: recovery at startup, then one task per consumer
//!
//! Each consumer owns a queue on the change bus and handles it strictly in
//! order. The reconciler records how far it got in the store so that a
//! restart replays whatever it missed from the journal.

use crate::config::EngineConfig;
use crate::consensus::RoundConsensus;
use crate::error::EngineError;
use crate::reconciler::Reconciler;
use crate::relay::{publish_change, LiveRelay, DEFAULT_RELAY_CAPACITY};
use huntsync_adapters::{ChatAdapter, DocsAdapter, Publisher};
use huntsync_core::{BusError, ChangeId, ChangeReceiver, Clock, Subscription, SystemClock};
use huntsync_storage::RecordStore;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// External systems the engine drives
pub struct EngineDeps<C, D, P> {
    pub chat: C,
    pub docs: D,
    pub publisher: P,
}

/// A running engine. Dropping it stops the consumers without waiting for
/// them; [`Engine::shutdown`] waits.
pub struct Engine<C, D, K = SystemClock> {
    store: RecordStore,
    reconciler: Reconciler<C, D, K>,
    consensus: RoundConsensus<C, K>,
    relay: LiveRelay,
    reconciled: watch::Receiver<ChangeId>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl<C, D, K> Engine<C, D, K>
where
    C: ChatAdapter,
    D: DocsAdapter,
    K: Clock,
{
    /// Recover and start every consumer.
    ///
    /// Queues are subscribed before the journal is read, so a change made
    /// during recovery is seen by both and reconciled once.
    pub async fn start<P: Publisher>(
        store: RecordStore,
        deps: EngineDeps<C, D, P>,
        clock: K,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let bus = store.bus().clone();
        let reconcile_rx = bus.subscribe(Subscription::all("reconciler", "Reconcile external systems"));
        let publish_rx = bus.subscribe(Subscription::all("publisher", "Broadcast to pub/sub"));
        let relay_rx = bus.subscribe(Subscription::all("relay", "Forward to live sessions"));

        let reconciler = Reconciler::new(
            store.clone(),
            deps.chat.clone(),
            deps.docs,
            clock.clone(),
            config.clone(),
        );
        let consensus = RoundConsensus::new(store.clone(), deps.chat, clock, config.clone());
        let relay = LiveRelay::new(store.clone(), DEFAULT_RELAY_CAPACITY);

        match reconciler.restore_archive_categories().await {
            Ok(archives) => tracing::info!(count = archives.len(), "archive categories ready"),
            // Restored lazily on the first solve instead
            Err(e) => tracing::warn!(error = %e, "could not restore archive categories"),
        }

        let replayed = replay(&store, &reconciler).await?;
        let (reconciled_tx, reconciled) = watch::channel(replayed);

        match consensus.restore().await {
            Ok(armed) => tracing::info!(
                pending = store.round_proposals().len(),
                armed,
                "round proposals restored"
            ),
            Err(e) => tracing::error!(error = %e, "could not restore round proposals"),
        }

        let (shutdown, stop) = watch::channel(false);
        let mut tasks = vec![
            (
                "reconciler",
                tokio::spawn(reconcile_loop(
                    reconciler.clone(),
                    store.clone(),
                    reconcile_rx,
                    replayed,
                    reconciled_tx,
                    stop.clone(),
                )),
            ),
            (
                "publisher",
                tokio::spawn(publish_loop(deps.publisher, publish_rx, stop.clone())),
            ),
            (
                "relay",
                tokio::spawn(relay_loop(relay.clone(), relay_rx, stop.clone())),
            ),
            (
                "depth-monitor",
                tokio::spawn(depth_loop(store.clone(), config.depth_check_interval, stop.clone())),
            ),
        ];
        if let Some(interval) = config.sweep_interval {
            tasks.push((
                "sweep",
                tokio::spawn(sweep_loop(reconciler.clone(), interval, stop.clone())),
            ));
        }

        tracing::info!(reconciled_through = %replayed, consumers = tasks.len(), "engine started");
        Ok(Self {
            store,
            reconciler,
            consensus,
            relay,
            reconciled,
            shutdown,
            tasks,
        })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn reconciler(&self) -> &Reconciler<C, D, K> {
        &self.reconciler
    }

    pub fn consensus(&self) -> &RoundConsensus<C, K> {
        &self.consensus
    }

    pub fn relay(&self) -> &LiveRelay {
        &self.relay
    }

    /// Resolves once a consumer queue has overflowed. The store refuses
    /// writes from then on, so the owner should shut down and restart.
    pub async fn halted(&self) -> BusError {
        self.store.bus().failed().await
    }

    /// Wait until the reconciler has finished every change up to `id`
    pub async fn wait_reconciled(&self, id: ChangeId) {
        let mut reconciled = self.reconciled.clone();
        // Only fails once the reconciler task is gone
        let _ = reconciled.wait_for(|through| *through >= id).await;
    }

    /// Cancel pending round timers and stop every consumer. Changes not
    /// yet reconciled are replayed on the next start.
    pub async fn shutdown(self) -> Result<(), EngineError> {
        self.consensus.cancel_all();
        let _ = self.shutdown.send(true);
        let mut panicked = None;
        for (name, task) in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(task = name, error = %e, "consumer task failed");
                panicked.get_or_insert(name);
            }
        }
        match panicked {
            Some(name) => Err(EngineError::TaskFailed(name.to_string())),
            None => {
                tracing::info!("engine stopped");
                Ok(())
            }
        }
    }
}

/// Reconcile every journaled change the previous process did not finish.
/// Returns the id reconciled through.
async fn replay<C, D, K>(
    store: &RecordStore,
    reconciler: &Reconciler<C, D, K>,
) -> Result<ChangeId, EngineError>
where
    C: ChatAdapter,
    D: DocsAdapter,
    K: Clock,
{
    let from = store.reconciled_through();
    let pending = store.journal_since(from);
    if pending.is_empty() {
        return Ok(from);
    }
    tracing::info!(%from, count = pending.len(), "replaying unreconciled changes");
    let mut through = from;
    for event in pending {
        // Failures are logged by the reconciler; replay moves on
        let _ = reconciler.reconcile(&event).await;
        through = event.change_id();
        store.set_reconciled_through(through)?;
    }
    Ok(through)
}

async fn reconcile_loop<C, D, K>(
    reconciler: Reconciler<C, D, K>,
    store: RecordStore,
    mut rx: ChangeReceiver,
    replayed: ChangeId,
    reconciled: watch::Sender<ChangeId>,
    mut stop: watch::Receiver<bool>,
) where
    C: ChatAdapter,
    D: DocsAdapter,
    K: Clock,
{
    loop {
        let event = tokio::select! {
            biased;
            _ = stop.changed() => break,
            event = rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };
        let change_id = event.change_id();
        if store.halted().is_some() {
            // Progress can no longer be recorded; the next start replays
            tracing::warn!(%change_id, "store halted, reconciler stopping");
            break;
        }
        if change_id <= replayed {
            // Already handled while replaying the journal
            if let Some(signal) = event.completion() {
                signal.complete(Ok(()));
            }
            continue;
        }

        let _ = reconciler.reconcile(&event).await;
        if let Err(e) = store.set_reconciled_through(change_id) {
            tracing::error!(%change_id, error = %e, "failed to record reconciliation progress");
        }
        reconciled.send_replace(change_id);
    }
    tracing::debug!("reconciler stopped");
}

async fn publish_loop<P: Publisher>(
    publisher: P,
    mut rx: ChangeReceiver,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            event = rx.recv() => match event {
                // Logged inside; the next change for the entity supersedes it
                Some(event) => { let _ = publish_change(&publisher, &event).await; }
                None => break,
            },
        }
    }
    tracing::debug!("publisher stopped");
}

async fn relay_loop(relay: LiveRelay, mut rx: ChangeReceiver, mut stop: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            event = rx.recv() => match event {
                Some(event) => {
                    let sessions = relay.send(&event);
                    tracing::trace!(change_id = %event.change_id(), sessions, "relayed");
                }
                None => break,
            },
        }
    }
    tracing::debug!("relay stopped");
}

/// Periodically log how far behind each consumer is
async fn depth_loop(store: RecordStore, every: Duration, mut stop: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => {
                for queue in store.bus().depths() {
                    if queue.depth * 2 >= queue.capacity {
                        tracing::warn!(
                            subscriber = %queue.subscriber.0,
                            depth = queue.depth,
                            capacity = queue.capacity,
                            "change queue filling up"
                        );
                    } else {
                        tracing::debug!(subscriber = %queue.subscriber.0, depth = queue.depth, "change queue depth");
                    }
                }
            }
        }
    }
}

async fn sweep_loop<C, D, K>(
    reconciler: Reconciler<C, D, K>,
    every: Duration,
    mut stop: watch::Receiver<bool>,
) where
    C: ChatAdapter,
    D: DocsAdapter,
    K: Clock,
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; startup already healed what replay saw
    ticker.tick().await;
    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => {
                let report = reconciler.sweep().await;
                tracing::debug!(checked = report.checked, healed = report.healed, "sweep finished");
            }
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
