// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn empty_file_is_all_defaults() {
    let config = DaemonConfig::parse("").unwrap();
    assert_eq!(config, DaemonConfig::default());
    assert_eq!(config.changelog_size, DEFAULT_CHANGELOG_SIZE);
}

#[test]
fn parses_engine_settings() {
    let config = DaemonConfig::parse(
        r#"
state_dir = "/srv/huntsync"
changelog_size = 512
bus_capacity = 64

[engine]
rate_limit_window = "3s"
quiet_period = "30s"
archive_count = 5
max_new_rounds = 2
sweep_interval = "10m"

[engine.channels]
more_eyes = "fresh-eyes"
qm = "quartermaster"
"#,
    )
    .unwrap();

    assert_eq!(config.changelog_size, 512);
    assert_eq!(config.bus_capacity, 64);
    assert_eq!(config.engine.rate_limit_window, Duration::from_secs(3));
    assert_eq!(config.engine.quiet_period, Duration::from_secs(30));
    assert_eq!(config.engine.archive_count, 5);
    assert_eq!(config.engine.max_new_rounds, 2);
    assert_eq!(config.engine.sweep_interval, Some(Duration::from_secs(600)));
    assert_eq!(config.engine.channels.more_eyes, "fresh-eyes");
    assert_eq!(config.engine.channels.hanging_out, "hanging-out");

    let paths = config.paths().unwrap();
    assert_eq!(paths.store_dir, PathBuf::from("/srv/huntsync/store"));
    assert_eq!(paths.log_path, PathBuf::from("/srv/huntsync/huntsyncd.log"));
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(DaemonConfig::parse("bus_capcity = 10").is_err());
}

#[test]
fn explicit_log_path_wins() {
    let config = DaemonConfig {
        state_dir: Some(PathBuf::from("/srv/huntsync")),
        log_path: Some(PathBuf::from("/var/log/huntsyncd.log")),
        ..DaemonConfig::default()
    };
    let paths = config.paths().unwrap();
    assert_eq!(paths.log_path, PathBuf::from("/var/log/huntsyncd.log"));
    assert_eq!(paths.lock_path, PathBuf::from("/srv/huntsync/huntsyncd.pid"));
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = DaemonConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}
