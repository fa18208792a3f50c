// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::round::RoundDraft;
use yare::parameterized;

fn alpha() -> PuzzleRecord {
    PuzzleDraft::new("Alpha", RoundId(5), "https://x").into_record(PuzzleId(1))
}

#[test]
fn minimal_draft_is_valid() {
    assert_eq!(alpha().validate(), Ok(()));
    assert_eq!(alpha().channel, Handle::Unset);
    assert_eq!(alpha().spreadsheet, Handle::Unset);
}

#[parameterized(
    missing_name = { "", 5, "https://x", "name", "is required" },
    missing_round = { "Alpha", 0, "https://x", "round", "is required" },
    missing_url = { "Alpha", 5, "", "puzzle_url", "is required" },
    bad_scheme = { "Alpha", 5, "mailto:hq@example.com", "puzzle_url", "is not a valid URL" },
)]
fn required_fields(name: &str, round: i64, url: &str, field: &str, message: &str) {
    let record = PuzzleDraft::new(name, RoundId(round), url).into_record(PuzzleId(1));
    let err = record.validate().unwrap_err();
    assert_eq!(err, ValidationError::new(field, message));
}

#[test]
fn solved_requires_answer() {
    let mut record = alpha();
    record.status = Status::Solved;
    assert_eq!(
        record.validate(),
        Err(ValidationError::new("status", "is solved but answer is blank"))
    );

    record.answer = "OCTOPUS".to_string();
    assert_eq!(record.validate(), Ok(()));
}

#[test]
fn unsolved_rejects_answer() {
    let mut record = alpha();
    record.status = Status::Working;
    record.answer = "OCTOPUS".to_string();
    assert_eq!(
        record.validate(),
        Err(ValidationError::new(
            "status",
            "is unsolved but answer is not blank"
        ))
    );
}

#[test]
fn join_and_record_round_trip_the_row() {
    let round = RoundDraft::new("Cavern", "🦇").into_round(RoundId(5));
    let puzzle = alpha().join(round.clone());
    assert_eq!(puzzle.round, round);
    assert_eq!(puzzle.record(), alpha());
}

#[test]
fn mention_prefers_channel() {
    let mut puzzle = alpha().join(Round::default());
    assert_eq!(puzzle.mention(), "**Alpha**");
    puzzle.channel = Handle::assigned("991");
    assert_eq!(puzzle.mention(), "<#991>");
}
