// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use huntsync_adapters::FakeChatAdapter;
use huntsync_core::{ChangeBus, PuzzleDraft, RoundDraft};
use huntsync_storage::StoreConfig;
use tempfile::TempDir;

fn setup() -> (TempDir, RecordStore, FakeChatAdapter, VoiceSync<FakeChatAdapter>) {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::open(dir.path(), ChangeBus::new(), StoreConfig::default()).unwrap();
    let chat = FakeChatAdapter::new();
    let sync = VoiceSync::new(chat.clone(), store.clone());
    (dir, store, chat, sync)
}

fn add(store: &RecordStore, name: &str, room: Option<&str>) {
    let round = match store.find_round_by_name("Cavern") {
        Some(round) => round,
        None => store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap(),
    };
    let mut draft = PuzzleDraft::new(name, round.id, "https://x");
    draft.voice_room = room.map(str::to_string);
    store.create_puzzle(draft).unwrap();
}

#[test]
fn title_sorts_names() {
    let names = vec!["Delta".to_string(), "Alpha".to_string()];
    assert_eq!(event_title(&names), "Alpha & Delta");
}

#[tokio::test]
async fn creates_one_event_per_room() {
    let (_dir, store, chat, sync) = setup();
    add(&store, "Delta", Some("vc-1"));
    add(&store, "Alpha", Some("vc-1"));
    add(&store, "Bravo", Some("vc-2"));
    add(&store, "Charlie", None);

    let report = sync.sync().await.unwrap();

    assert_eq!(report.created, 2);
    let mut titles: Vec<(String, String)> = chat
        .voice_events()
        .into_iter()
        .map(|e| (e.room, e.title))
        .collect();
    titles.sort();
    assert_eq!(
        titles,
        vec![
            ("vc-1".to_string(), "Alpha & Delta".to_string()),
            ("vc-2".to_string(), "Bravo".to_string()),
        ]
    );
}

#[tokio::test]
async fn retitles_and_deletes_managed_events_only() {
    let (_dir, store, chat, sync) = setup();
    add(&store, "Alpha", Some("vc-1"));
    let stale = chat.seed_voice_event("vc-1", "Old title", true);
    let empty = chat.seed_voice_event("vc-9", "Gone", true);
    let human = chat.seed_voice_event("vc-9", "Karaoke", false);

    let report = sync.sync().await.unwrap();

    assert_eq!(
        report,
        VoiceReport {
            created: 0,
            updated: 1,
            deleted: 1,
        }
    );
    let events = chat.voice_events();
    assert!(events.iter().any(|e| e.id == stale && e.title == "Alpha"));
    assert!(!events.iter().any(|e| e.id == empty));
    assert!(events.iter().any(|e| e.id == human));
}

#[tokio::test]
async fn second_sync_is_a_no_op() {
    let (_dir, store, _chat, sync) = setup();
    add(&store, "Alpha", Some("vc-1"));

    sync.sync().await.unwrap();
    assert!(sync.sync().await.unwrap().is_empty());
}
