// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    empty = { "", Status::NotStarted },
    spelled_out = { "Not Started", Status::NotStarted },
    working = { "Working", Status::Working },
    abandoned = { "Abandoned", Status::Abandoned },
    solved = { "Solved", Status::Solved },
    backsolved = { "Backsolved", Status::Backsolved },
    purchased = { "Purchased", Status::Purchased },
)]
fn parses_text(raw: &str, expected: Status) {
    assert_eq!(raw.parse::<Status>().unwrap(), expected);
}

#[test]
fn rejects_unknown_text() {
    assert_eq!(
        "Done".parse::<Status>(),
        Err(UnknownStatus("Done".to_string()))
    );
}

#[test]
fn solved_variants() {
    let solved: Vec<_> = Status::ALL.into_iter().filter(|s| s.is_solved()).collect();
    assert_eq!(
        solved,
        vec![Status::Solved, Status::Backsolved, Status::Purchased]
    );
    for status in Status::ALL {
        assert_eq!(status.is_solved(), status.solved_verb().is_some());
    }
}

#[test]
fn not_started_persists_as_empty_string() {
    assert_eq!(serde_json::to_string(&Status::NotStarted).unwrap(), "\"\"");
    let back: Status = serde_json::from_str("\"Backsolved\"").unwrap();
    assert_eq!(back, Status::Backsolved);
}
