// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! huntsync daemon (huntsyncd)
//!
//! Background process that owns the record store and keeps the external
//! systems in sync with it.

use std::path::PathBuf;

use huntsync_daemon::lifecycle::{
    self, setup_logging, write_startup_error, write_startup_marker, LifecycleError,
};
use huntsync_daemon::DaemonConfig;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments: an optional config file
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DaemonConfig::load(config_path.as_deref())?;
    let paths = config.paths()?;

    // Write startup marker to log (before tracing setup)
    write_startup_marker(&paths)?;

    // Set up logging
    let log_guard = setup_logging(&paths)?;

    info!(state_dir = %paths.state_dir.display(), "Starting huntsyncd");

    // Start daemon
    let daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&paths, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    // Signal ready for parent process (e.g., systemd)
    println!("READY");

    let halted = tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
            None
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
            None
        }
        err = daemon.halted() => {
            error!(error = %err, "Change queue overflowed, shutting down");
            Some(err)
        }
    };

    daemon.shutdown().await?;
    info!("Daemon stopped");
    match halted {
        Some(err) => Err(LifecycleError::Halted(err).into()),
        None => Ok(()),
    }
}
