// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use huntsync_adapters::FakePublisher;
use huntsync_core::{ChangeBus, ChangeKind, PuzzleDraft, RoundDraft};
use huntsync_storage::StoreConfig;
use tempfile::TempDir;

fn store_with(changelog_size: usize) -> (TempDir, RecordStore) {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig {
        changelog_size,
        ..StoreConfig::default()
    };
    let store = RecordStore::open(dir.path(), ChangeBus::new(), config).unwrap();
    (dir, store)
}

#[tokio::test]
async fn published_message_carries_the_latest_snapshot() {
    let (_dir, store) = store_with(16);
    let round = store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();
    store.delete_round(round.id).unwrap();
    let publisher = FakePublisher::new();

    for event in store.journal_since(ChangeId(0)) {
        publish_change(&publisher, &event).await.unwrap();
    }

    let published = publisher.published();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].kind, ChangeKind::Upsert);
    assert_eq!(published[1].kind, ChangeKind::Delete);
    assert_eq!(published[1].round.as_ref().map(|r| r.id), Some(round.id));
}

#[tokio::test]
async fn publish_failure_is_reported() {
    let (_dir, store) = store_with(16);
    store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();
    let publisher = FakePublisher::new();
    publisher.fail_next(PublishError::Request("offline".to_string()));

    let event = store.journal_since(ChangeId(0)).remove(0);
    assert!(publish_change(&publisher, &event).await.is_err());
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn live_sessions_receive_changes_in_order() {
    let (_dir, store) = store_with(16);
    let relay = LiveRelay::new(store.clone(), DEFAULT_RELAY_CAPACITY);
    let mut session = relay.subscribe();
    assert_eq!(relay.session_count(), 1);

    let round = store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();
    store
        .create_puzzle(PuzzleDraft::new("Alpha", round.id, "https://hunt.example/alpha"))
        .unwrap();
    for event in store.journal_since(ChangeId(0)) {
        assert_eq!(relay.send(&event), 1);
    }

    let first = session.recv().await.unwrap();
    let second = session.recv().await.unwrap();
    assert!(first.round.is_some());
    assert_eq!(second.puzzle.map(|p| p.name), Some("Alpha".to_string()));
    assert_eq!(second.change_id, first.change_id.next());
}

#[test]
fn send_without_sessions_is_harmless() {
    let (_dir, store) = store_with(16);
    let relay = LiveRelay::new(store.clone(), 4);
    store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();

    let event = store.journal_since(ChangeId(0)).remove(0);
    assert_eq!(relay.send(&event), 0);
}

#[test]
fn catch_up_replays_from_the_journal() {
    let (_dir, store) = store_with(16);
    let relay = LiveRelay::new(store.clone(), 4);
    let round = store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();
    let seen = store.last_change_id();
    store.update_round(round.id, |r| r.name = "Grotto".to_string()).unwrap();
    store.update_round(round.id, |r| r.sort = 3).unwrap();

    let missed = relay.catch_up(seen).unwrap();
    assert_eq!(missed.len(), 2);
    assert_eq!(missed[0].change_id, seen.next());
    assert_eq!(
        missed[1].round.as_ref().map(|r| r.name.as_str()),
        Some("Grotto")
    );

    assert_eq!(relay.catch_up(store.last_change_id()), Some(Vec::new()));
}

#[test]
fn catch_up_past_the_journal_requires_a_reload() {
    let (_dir, store) = store_with(2);
    let relay = LiveRelay::new(store.clone(), 4);
    let round = store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();
    let seen = store.last_change_id();
    for sort in 0..3 {
        store.update_round(round.id, |r| r.sort = sort + 1).unwrap();
    }

    assert_eq!(relay.catch_up(seen), None);
}

#[tokio::test]
async fn lagging_session_is_told_to_resync() {
    let (_dir, store) = store_with(16);
    let relay = LiveRelay::new(store.clone(), 1);
    let mut session = relay.subscribe();
    let round = store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();
    store.update_round(round.id, |r| r.emoji = "🦀".to_string()).unwrap();

    for event in store.journal_since(ChangeId(0)) {
        relay.send(&event);
    }

    assert!(matches!(
        session.recv().await,
        Err(broadcast::error::RecvError::Lagged(1))
    ));
}
