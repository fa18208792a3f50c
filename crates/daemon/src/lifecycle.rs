// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, logging.

use std::fs::File;
use std::io::Write;
use std::time::Instant;

use fs2::FileExt;
use huntsync_adapters::{
    NoOpChatAdapter, NoOpDocsAdapter, NoOpPublisher, TracedChatAdapter, TracedDocsAdapter,
    TracedPublisher,
};
use huntsync_core::{BusError, ChangeBus, SystemClock};
use huntsync_engine::{Engine, EngineDeps, EngineError};
use huntsync_storage::{RecordStore, StoreConfig, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, DaemonConfig, Paths};

/// Engine with concrete adapter types (wrapped with tracing)
pub type DaemonEngine = Engine<
    TracedChatAdapter<NoOpChatAdapter>,
    TracedDocsAdapter<NoOpDocsAdapter>,
    SystemClock,
>;

/// Startup marker prefix written to log before anything else.
/// Full format: "--- huntsyncd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- huntsyncd: starting (pid: ";

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Stopped after {0}")]
    Halted(#[from] BusError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A running daemon
pub struct Daemon {
    pub paths: Paths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub engine: DaemonEngine,
    pub start_time: Instant,
}

/// Start the daemon
pub async fn startup(config: &DaemonConfig) -> Result<Daemon, LifecycleError> {
    let paths = config.paths()?;
    let result = startup_inner(config, &paths).await;
    match &result {
        // The lock file belongs to the running daemon
        Err(LifecycleError::LockFailed(_)) | Ok(_) => {}
        Err(_) => cleanup_on_failure(&paths),
    }
    result
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &DaemonConfig, paths: &Paths) -> Result<Daemon, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&paths.state_dir)?;

    // 2. Acquire lock file FIRST - prevents two daemons sharing a store
    let mut lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // 3. Open the store, replaying its WAL
    let bus = ChangeBus::with_capacity(config.bus_capacity);
    let store_config = StoreConfig {
        changelog_size: config.changelog_size,
        ..StoreConfig::default()
    };
    let store = RecordStore::open(&paths.store_dir, bus, store_config)?;

    // 4. Start the engine: recovery, then the consumers
    let deps = EngineDeps {
        chat: TracedChatAdapter::new(NoOpChatAdapter::new()),
        docs: TracedDocsAdapter::new(NoOpDocsAdapter::new()),
        publisher: TracedPublisher::new(NoOpPublisher::new()),
    };
    let engine = Engine::start(store, deps, SystemClock, config.engine.clone()).await?;

    info!(state_dir = %paths.state_dir.display(), "daemon started");

    Ok(Daemon {
        paths: paths.clone(),
        lock_file,
        engine,
        start_time: Instant::now(),
    })
}

impl Daemon {
    /// Resolves once a consumer queue overflows and the store stops taking
    /// writes
    pub async fn halted(&self) -> BusError {
        self.engine.halted().await
    }

    /// Shutdown the daemon gracefully
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        // 1. Stop consumers; pending round timers are cancelled
        let store = self.engine.store().clone();
        self.engine.shutdown().await?;

        // 2. Fold the WAL into a snapshot so the next start replays less
        if let Err(e) = store.compact() {
            warn!(error = %e, "failed to compact store");
        }

        // 3. Remove PID file; the lock is released when lock_file drops
        if self.paths.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "Daemon shutdown complete"
        );
        Ok(())
    }
}

/// Clean up resources on startup failure
fn cleanup_on_failure(paths: &Paths) {
    if paths.lock_path.exists() {
        let _ = std::fs::remove_file(&paths.lock_path);
    }
}

/// Write startup marker to log file (appends to existing log)
pub fn write_startup_marker(paths: &Paths) -> Result<(), LifecycleError> {
    if let Some(parent) = paths.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

/// Write startup error synchronously to log file.
/// This ensures the error is visible even if the process exits quickly.
pub fn write_startup_error(paths: &Paths, error: &LifecycleError) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

pub fn setup_logging(
    paths: &Paths,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (Some(dir), Some(file)) = (paths.log_path.parent(), paths.log_path.file_name()) else {
        return Err(LifecycleError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid log path {}", paths.log_path.display()),
        )));
    };
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
