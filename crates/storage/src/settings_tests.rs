// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::StoreConfig;
use huntsync_core::{ChangeBus, ProposedPuzzle};
use tempfile::TempDir;

fn open(dir: &TempDir) -> RecordStore {
    RecordStore::open(dir.path(), ChangeBus::new(), StoreConfig::default()).unwrap()
}

#[test]
fn defaults_when_unset() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    assert!(store.discovery_enabled());
    assert!(store.round_proposals().is_empty());
    assert_eq!(store.reminder_timestamp(), None);
    assert_eq!(store.reconciled_through(), ChangeId(0));
}

#[test]
fn sync_epoch_increments_on_every_open() {
    let dir = TempDir::new().unwrap();
    assert_eq!(open(&dir).sync_epoch(), 1);
    assert_eq!(open(&dir).sync_epoch(), 2);
    let store = open(&dir);
    assert_eq!(store.sync_epoch(), 3);
    assert_eq!(store.last_change_id(), ChangeId::epoch_start(3));
}

#[test]
fn settings_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let proposal = ProposedRound {
        message_id: "m1".to_string(),
        name: "Cavern".to_string(),
        notified_at: Utc::now(),
        puzzles: vec![ProposedPuzzle {
            name: "Alpha".to_string(),
            round: "Cavern".to_string(),
            url: "https://x".to_string(),
        }],
    };
    {
        let store = open(&dir);
        store.set_discovery_enabled(false).unwrap();
        store.set_round_proposals(&[proposal.clone()]).unwrap();
        store.set_reconciled_through(ChangeId(99)).unwrap();
    }

    let store = open(&dir);
    assert!(!store.discovery_enabled());
    assert_eq!(store.round_proposals(), vec![proposal]);
    assert_eq!(store.reconciled_through(), ChangeId(99));
}

#[test]
fn reconciled_watermark_never_moves_backwards() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.set_reconciled_through(ChangeId(10)).unwrap();
    store.set_reconciled_through(ChangeId(4)).unwrap();
    assert_eq!(store.reconciled_through(), ChangeId(10));
}

#[test]
fn unreadable_setting_reads_as_unset() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.put_setting(DISCOVERY_ENABLED, &"maybe").unwrap();
    assert!(store.discovery_enabled());
}
