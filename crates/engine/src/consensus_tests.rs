// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use huntsync_adapters::FakeChatAdapter;
use huntsync_core::{ChangeBus, FakeClock};
use huntsync_storage::StoreConfig;
use std::time::Duration;
use tempfile::TempDir;

type TestConsensus = RoundConsensus<FakeChatAdapter, FakeClock>;

fn setup() -> (TempDir, RecordStore, FakeChatAdapter, TestConsensus) {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::open(dir.path(), ChangeBus::new(), StoreConfig::default()).unwrap();
    let chat = FakeChatAdapter::new();
    let consensus = RoundConsensus::new(
        store.clone(),
        chat.clone(),
        FakeClock::new(),
        EngineConfig::default(),
    );
    (dir, store, chat, consensus)
}

fn puzzles(names: &[&str]) -> Vec<ProposedPuzzle> {
    names
        .iter()
        .map(|name| ProposedPuzzle {
            name: name.to_string(),
            round: "Cavern".to_string(),
            url: format!("https://hunt.example/{}", name.to_lowercase()),
        })
        .collect()
}

async fn posted(consensus: &TestConsensus, name: &str) -> String {
    match consensus
        .propose(name, puzzles(&["Alpha", "Bravo"]))
        .await
        .unwrap()
    {
        ProposeOutcome::Posted { message_id } => message_id,
        other => panic!("expected a posted proposal, got {:?}", other),
    }
}

#[test]
fn notice_lists_puzzles_up_to_the_limit() {
    let text = proposal_notice("Cavern", &puzzles(&["Alpha", "Bravo", "Charlie"]), 2);
    similar_asserts::assert_eq!(
        text,
        "```*** ❓ NEW ROUND: \"Cavern\" ***\n\n\
         Alpha\nhttps://hunt.example/alpha\n\n\
         Bravo\nhttps://hunt.example/bravo\n\n\
         (...and more, 3 in total...)\n\n\
         Reminder: use `/qm discovery pause` to stop the bot.\n\n\
         >> REACT TO PROPOSE AN EMOJI FOR THIS ROUND <<\n```\n"
    );
}

#[tokio::test]
async fn propose_posts_and_persists() {
    let (_dir, store, chat, consensus) = setup();

    let message_id = posted(&consensus, "Cavern").await;

    assert_eq!(chat.messages_to("qm").len(), 1);
    let pending = store.round_proposals();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].message_id, message_id);
    assert_eq!(pending[0].puzzles.len(), 2);
}

#[tokio::test]
async fn duplicate_and_existing_rounds_are_ignored() {
    let (_dir, store, chat, consensus) = setup();
    posted(&consensus, "Cavern").await;
    store.create_round(RoundDraft::new("Grotto", "🦇")).unwrap();

    assert_eq!(
        consensus.propose("cavern", puzzles(&["Alpha"])).await.unwrap(),
        ProposeOutcome::AlreadyPending
    );
    assert_eq!(
        consensus.propose("Grotto", puzzles(&["Alpha"])).await.unwrap(),
        ProposeOutcome::RoundExists
    );
    assert_eq!(chat.messages_to("qm").len(), 1);
}

#[tokio::test]
async fn disabled_discovery_refuses_proposals() {
    let (_dir, store, chat, consensus) = setup();
    store.set_discovery_enabled(false).unwrap();

    assert_eq!(
        consensus.propose("Cavern", puzzles(&["Alpha"])).await.unwrap(),
        ProposeOutcome::DiscoveryDisabled
    );
    assert!(chat.messages().is_empty());
}

#[tokio::test]
async fn oversized_burst_is_refused_with_a_notice() {
    let (_dir, store, chat, consensus) = setup();
    let rounds: BTreeMap<String, Vec<ProposedPuzzle>> = ["A", "B", "C", "D", "E"]
        .iter()
        .map(|name| (name.to_string(), puzzles(&["Alpha"])))
        .collect();

    let outcomes = consensus.propose_all(rounds).await.unwrap();

    assert!(outcomes.iter().all(|(_, o)| *o == ProposeOutcome::TooMany));
    assert_eq!(
        chat.messages_to("qm"),
        vec![
            "```💥 Too many new rounds! Round creation paused, please contact #tech.\n```\n"
                .to_string()
        ]
    );
    assert!(store.round_proposals().is_empty());
}

#[tokio::test(start_paused = true)]
async fn signal_at_deadline_commits_round_and_puzzles() {
    let (_dir, store, chat, consensus) = setup();
    let message_id = posted(&consensus, "Cavern").await;

    chat.set_reaction(&message_id, "🦀");
    assert_eq!(
        consensus.signal_changed(&message_id).await.unwrap(),
        SignalOutcome::Armed
    );
    assert_eq!(
        consensus.signal_changed(&message_id).await.unwrap(),
        SignalOutcome::Unchanged
    );
    tokio::time::sleep(Duration::from_secs(11)).await;

    let round = store.find_round_by_name("Cavern").unwrap();
    assert_eq!(round.emoji, "🦀");
    let mut names: Vec<String> = store
        .list_puzzles()
        .into_iter()
        .filter(|p| p.round.id == round.id)
        .map(|p| p.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Alpha", "Bravo"]);
    assert!(store.round_proposals().is_empty());
    assert!(!consensus.is_armed(&message_id));
}

#[tokio::test(start_paused = true)]
async fn withdrawal_before_deadline_commits_nothing() {
    let (_dir, store, chat, consensus) = setup();
    let message_id = posted(&consensus, "Cavern").await;

    chat.set_reaction(&message_id, "🦀");
    consensus.signal_changed(&message_id).await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    chat.clear_reaction(&message_id);
    assert_eq!(
        consensus.signal_changed(&message_id).await.unwrap(),
        SignalOutcome::Cancelled
    );
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(store.list_rounds().is_empty());
    assert_eq!(store.round_proposals().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rearming_after_withdrawal_restarts_the_quiet_period() {
    let (_dir, store, chat, consensus) = setup();
    let message_id = posted(&consensus, "Cavern").await;

    chat.set_reaction(&message_id, "🦀");
    consensus.signal_changed(&message_id).await.unwrap();
    tokio::time::sleep(Duration::from_secs(8)).await;
    chat.clear_reaction(&message_id);
    consensus.signal_changed(&message_id).await.unwrap();
    chat.set_reaction(&message_id, "🐙");
    consensus.signal_changed(&message_id).await.unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(store.list_rounds().is_empty());

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(store.find_round_by_name("Cavern").unwrap().emoji, "🐙");
}

#[tokio::test(start_paused = true)]
async fn signal_gone_at_deadline_keeps_proposal_pending() {
    let (_dir, store, chat, consensus) = setup();
    let message_id = posted(&consensus, "Cavern").await;

    chat.set_reaction(&message_id, "🦀");
    consensus.signal_changed(&message_id).await.unwrap();
    chat.clear_reaction(&message_id);
    tokio::time::sleep(Duration::from_secs(11)).await;

    assert!(store.list_rounds().is_empty());
    assert_eq!(store.round_proposals().len(), 1);
    assert!(!consensus.is_armed(&message_id));
}

#[tokio::test(start_paused = true)]
async fn restore_rearms_signalled_proposals_and_drops_orphans() {
    let (_dir, store, chat, consensus) = setup();
    let signalled = posted(&consensus, "Cavern").await;
    let quiet = posted(&consensus, "Grotto").await;
    let orphan = posted(&consensus, "Lagoon").await;
    chat.set_reaction(&signalled, "🦀");
    chat.delete_message(&orphan);

    // A fresh instance, as after a restart
    let restarted = RoundConsensus::new(
        store.clone(),
        chat.clone(),
        FakeClock::new(),
        EngineConfig::default(),
    );
    assert_eq!(restarted.restore().await.unwrap(), 1);
    assert!(restarted.is_armed(&signalled));
    assert!(!restarted.is_armed(&quiet));
    let names: Vec<String> = store.round_proposals().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Cavern", "Grotto"]);

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(store.find_round_by_name("Cavern").is_some());
}

#[tokio::test(start_paused = true)]
async fn round_created_during_quiet_period_is_not_duplicated() {
    let (_dir, store, chat, consensus) = setup();
    let message_id = posted(&consensus, "Cavern").await;
    chat.set_reaction(&message_id, "🦀");
    consensus.signal_changed(&message_id).await.unwrap();

    store.create_round(RoundDraft::new("Cavern", "🦇")).unwrap();
    tokio::time::sleep(Duration::from_secs(11)).await;

    let caverns = store
        .list_rounds()
        .into_iter()
        .filter(|r| r.name == "Cavern")
        .count();
    assert_eq!(caverns, 1);
    assert!(store.list_puzzles().is_empty());
    assert!(store.round_proposals().is_empty());
}

#[tokio::test(start_paused = true)]
async fn restore_drops_proposals_whose_round_exists() {
    let (_dir, store, chat, consensus) = setup();
    let message_id = posted(&consensus, "Cavern").await;
    // Stopped after the round was written but before the proposal was
    store.create_round(RoundDraft::new("Cavern", "🦀")).unwrap();
    chat.set_reaction(&message_id, "🦀");

    let restarted = RoundConsensus::new(
        store.clone(),
        chat.clone(),
        FakeClock::new(),
        EngineConfig::default(),
    );
    assert_eq!(restarted.restore().await.unwrap(), 0);
    assert!(!restarted.is_armed(&message_id));
    assert!(store.round_proposals().is_empty());

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(store.list_rounds().len(), 1);
    assert!(store.list_puzzles().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_all_disarms_every_timer() {
    let (_dir, store, chat, consensus) = setup();
    let message_id = posted(&consensus, "Cavern").await;
    chat.set_reaction(&message_id, "🦀");
    consensus.signal_changed(&message_id).await.unwrap();

    assert_eq!(consensus.cancel_all(), 1);
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(store.list_rounds().is_empty());
    assert_eq!(store.round_proposals().len(), 1);
}

#[tokio::test]
async fn unknown_messages_are_ignored() {
    let (_dir, _store, _chat, consensus) = setup();
    assert_eq!(
        consensus.signal_changed("msg-404").await.unwrap(),
        SignalOutcome::Unknown
    );
}
