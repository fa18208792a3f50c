// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::wal::reader::WalReader;
use serde_json::json;
use tempfile::TempDir;

fn temp_wal_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("wal.jsonl");
    (dir, path)
}

fn sample_operation() -> Operation {
    Operation::setting("reconciled_through", json!(42))
}

#[test]
fn writer_creates_file_and_parents() {
    let (_dir, path) = temp_wal_path();

    let writer = WalWriter::open(&path, "m1", 0).unwrap();

    assert!(path.exists());
    assert_eq!(writer.sequence(), 0);
    assert_eq!(writer.path(), path);
}

#[test]
fn writer_append_increments_sequence() {
    let (_dir, path) = temp_wal_path();
    let mut writer = WalWriter::open(&path, "m1", 0).unwrap();

    assert_eq!(writer.append(sample_operation()).unwrap(), 0);
    assert_eq!(writer.append(sample_operation()).unwrap(), 1);
    assert_eq!(writer.sequence(), 2);
}

#[test]
fn writer_persists_one_line_per_entry() {
    let (_dir, path) = temp_wal_path();
    {
        let mut writer = WalWriter::open(&path, "m1", 0).unwrap();
        writer.append(sample_operation()).unwrap();
        writer.append(sample_operation()).unwrap();
    }

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.ends_with('\n'));
}

#[test]
fn rewrite_replaces_contents_and_resets_sequence() {
    let (_dir, path) = temp_wal_path();
    let mut writer = WalWriter::open(&path, "m1", 0).unwrap();
    for _ in 0..5 {
        writer.append(sample_operation()).unwrap();
    }

    writer
        .rewrite(vec![Operation::setting("sync_epoch", json!(3))])
        .unwrap();
    assert_eq!(writer.sequence(), 1);
    writer.append(sample_operation()).unwrap();

    let entries: Vec<_> = WalReader::open_or_empty(&path)
        .entries()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].operation, Operation::setting("sync_epoch", json!(3)));
    assert_eq!(entries[1].sequence, 1);
}

#[test]
fn truncate_drops_tail() {
    let (_dir, path) = temp_wal_path();
    let mut writer = WalWriter::open(&path, "m1", 0).unwrap();
    writer.append(sample_operation()).unwrap();
    let len = std::fs::metadata(&path).unwrap().len();
    writer.append(sample_operation()).unwrap();

    truncate(&path, len).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
}
