// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn same_key_is_exclusive() {
    let locks = KeyedLocks::new();
    let key = EntityKey::Puzzle(PuzzleId(1));

    let guard = locks.acquire(key, Facet::Channel).await;
    let contended = tokio::time::timeout(
        Duration::from_millis(20),
        locks.acquire(key, Facet::Channel),
    )
    .await;
    assert!(contended.is_err());

    drop(guard);
    let _again = locks.acquire(key, Facet::Channel).await;
}

#[tokio::test]
async fn different_keys_do_not_contend() {
    let locks = KeyedLocks::new();
    let _channel = locks
        .acquire(EntityKey::Puzzle(PuzzleId(1)), Facet::Channel)
        .await;
    let _sheet = locks
        .acquire(EntityKey::Puzzle(PuzzleId(1)), Facet::Spreadsheet)
        .await;
    let _other = locks
        .acquire(EntityKey::Puzzle(PuzzleId(2)), Facet::Channel)
        .await;
}

#[test]
fn entity_keys_display_kind_and_id() {
    assert_eq!(EntityKey::Round(RoundId(5)).to_string(), "round:5");
    assert_eq!(EntityKey::Archive.to_string(), "archive");
}
