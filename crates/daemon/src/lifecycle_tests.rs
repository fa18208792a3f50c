// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use huntsync_core::{PuzzleDraft, RoundDraft, Subscription};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> DaemonConfig {
    DaemonConfig {
        state_dir: Some(dir.path().to_path_buf()),
        ..DaemonConfig::default()
    }
}

#[tokio::test]
async fn startup_locks_and_shutdown_releases() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let daemon = startup(&config).await.unwrap();
    let pid = std::fs::read_to_string(&daemon.paths.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());

    let lock_path = daemon.paths.lock_path.clone();
    daemon.shutdown().await.unwrap();
    assert!(!lock_path.exists());
}

#[tokio::test]
async fn second_daemon_on_the_same_state_dir_is_refused() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let first = startup(&config).await.unwrap();

    let err = startup(&config).await.err().unwrap();

    assert!(matches!(err, LifecycleError::LockFailed(_)));
    assert!(first.paths.lock_path.exists());
    first.shutdown().await.unwrap();
}

#[tokio::test]
async fn records_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let daemon = startup(&config).await.unwrap();
    let store = daemon.engine.store().clone();
    let round = store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();
    store
        .create_puzzle(PuzzleDraft::new("Alpha", round.id, "https://hunt.example/alpha"))
        .unwrap();
    daemon.engine.wait_reconciled(store.last_change_id()).await;
    let last = store.last_change_id();
    daemon.shutdown().await.unwrap();
    drop(store);

    let daemon = startup(&config).await.unwrap();
    let store = daemon.engine.store();
    assert_eq!(store.list_puzzles().len(), 1);
    assert!(store.reconciled_through() >= last);
    assert!(store.last_change_id() > last);
    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn overflowed_daemon_halts_and_restarts_cleanly() {
    let dir = TempDir::new().unwrap();
    let config = DaemonConfig {
        bus_capacity: 1,
        ..config_in(&dir)
    };

    let daemon = startup(&config).await.unwrap();
    let store = daemon.engine.store().clone();
    let _stuck = store.bus().subscribe(Subscription::all("stuck", "Never drains"));
    store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();
    assert!(store.create_round(RoundDraft::new("Grotto", "🦀")).is_err());

    let err = daemon.halted().await;
    assert!(LifecycleError::Halted(err).to_string().contains("stuck"));
    daemon.shutdown().await.unwrap();
    drop(store);

    let daemon = startup(&config_in(&dir)).await.unwrap();
    let store = daemon.engine.store().clone();
    assert_eq!(store.list_rounds().len(), 2);
    store.create_round(RoundDraft::new("Lagoon", "🐙")).unwrap();
    daemon.shutdown().await.unwrap();
}

#[test]
fn startup_marker_is_appended() {
    let dir = TempDir::new().unwrap();
    let paths = config_in(&dir).paths().unwrap();

    write_startup_marker(&paths).unwrap();
    write_startup_marker(&paths).unwrap();

    let log = std::fs::read_to_string(&paths.log_path).unwrap();
    assert_eq!(log.matches(STARTUP_MARKER_PREFIX).count(), 2);
}
