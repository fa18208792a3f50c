// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use huntsync_adapters::{ChatCall, FakeChatAdapter};
use huntsync_core::{ChangeBus, ChannelOrder, Handle, PuzzleDraft, RoundDraft};
use huntsync_storage::StoreConfig;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    chat: FakeChatAdapter,
    store: RecordStore,
    sorter: Sorter<FakeChatAdapter>,
    round: Round,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::open(dir.path(), ChangeBus::new(), StoreConfig::default()).unwrap();
    let chat = FakeChatAdapter::new();
    let category = chat.create_category("Round: Cavern").await.unwrap();
    let mut draft = RoundDraft::new("Cavern", "🦇");
    draft.category = Handle::assigned(category);
    let round = store.create_round(draft).unwrap();
    Fixture {
        _dir: dir,
        sorter: Sorter::new(chat.clone(), store.clone()),
        chat,
        store,
        round,
    }
}

impl Fixture {
    /// Store a puzzle with a live channel at `position`
    async fn puzzle(&self, name: &str, position: i64) -> Puzzle {
        let channel = self.chat.create_channel(name, None).await.unwrap();
        self.chat.set_position(&channel, position);
        let mut draft = PuzzleDraft::new(name, self.round.id, "https://x");
        draft.channel = Handle::assigned(channel);
        self.store.create_puzzle(draft).unwrap()
    }

    fn sorts(&self) -> Vec<Vec<ChannelOrder>> {
        self.chat
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                ChatCall::SortChannels { orders } => Some(orders),
                _ => None,
            })
            .collect()
    }
}

#[tokio::test]
async fn insertion_moves_only_the_new_and_shifted_channels() {
    let f = fixture().await;
    f.puzzle("Bravo", 65).await;
    let delta = f.puzzle("Delta", 66).await;
    let charlie = f.puzzle("Charlie", 0).await;

    let position = f.sorter.resort_puzzle(&charlie).await.unwrap();

    assert_eq!(position, 66);
    let sorts = f.sorts();
    assert_eq!(sorts.len(), 1);
    assert_eq!(
        sorts[0],
        vec![
            ChannelOrder::new(charlie.channel.as_str(), 66),
            ChannelOrder::new(delta.channel.as_str(), 67),
        ]
    );
}

#[tokio::test]
async fn appending_moves_one_channel() {
    let f = fixture().await;
    f.puzzle("Alpha", 65).await;
    f.puzzle("Bravo", 66).await;
    let zulu = f.puzzle("Zulu", 0).await;

    f.sorter.resort_puzzle(&zulu).await.unwrap();

    assert_eq!(
        f.sorts(),
        vec![vec![ChannelOrder::new(zulu.channel.as_str(), 67)]]
    );
}

#[tokio::test]
async fn settled_order_sends_nothing() {
    let f = fixture().await;
    let alpha = f.puzzle("Alpha", 65).await;
    f.puzzle("Bravo", 66).await;

    assert_eq!(f.sorter.resort_puzzle(&alpha).await.unwrap(), 65);
    assert!(f.sorts().is_empty());
}

#[tokio::test]
async fn rounds_pin_archives_after_every_round() {
    let f = fixture().await;
    let archive = f.chat.create_category("Solved A").await.unwrap();
    let cavern = f.round.category.as_str().to_string();

    let position = f
        .sorter
        .resort_round(&f.round, std::slice::from_ref(&archive))
        .await
        .unwrap();

    assert_eq!(position, 64);
    assert_eq!(
        f.sorts(),
        vec![vec![
            ChannelOrder::new(cavern, 64),
            ChannelOrder::new(archive, 256),
        ]]
    );
}
