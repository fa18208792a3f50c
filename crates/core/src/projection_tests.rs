// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::handle::Handle;
use crate::id::{PuzzleId, RoundId};
use crate::puzzle::PuzzleDraft;
use crate::round::RoundDraft;
use yare::parameterized;

fn puzzle() -> Puzzle {
    let mut round = RoundDraft::new("Cavern", "🦇").into_round(RoundId(5));
    round.category = Handle::assigned("cat-5");
    let mut puzzle = PuzzleDraft::new("Alpha", RoundId(5), "https://x")
        .into_record(PuzzleId(1))
        .join(round);
    puzzle.channel = Handle::assigned("chan-1");
    puzzle
}

#[test]
fn unrelated_field_leaves_channel_fresh() {
    let before = puzzle();
    let mut after = puzzle();
    after.note = "needs eyes".to_string();

    assert!(!is_stale(Some(&before), &after, ChannelFields::of));
    assert!(is_stale(Some(&before), &after, PinFields::of));
    assert!(!is_stale(Some(&before), &after, SpreadsheetFields::of));
    assert!(!is_stale(Some(&before), &after, VoiceRoomFields::of));
}

#[test]
fn solving_touches_channel_pin_and_sheet() {
    let before = puzzle();
    let mut after = puzzle();
    after.status = Status::Solved;
    after.answer = "OCTOPUS".to_string();

    assert!(is_stale(Some(&before), &after, ChannelFields::of));
    assert!(is_stale(Some(&before), &after, PinFields::of));
    assert!(is_stale(Some(&before), &after, SpreadsheetFields::of));
    assert_eq!(ChannelFields::of(&after).title(), "✅ Alpha");
}

#[test]
fn creation_is_always_stale() {
    assert!(is_stale(None, &puzzle(), VoiceRoomFields::of));
}

#[test]
fn intentionally_absent_handles_project_as_none() {
    let mut p = puzzle();
    p.spreadsheet = Handle::Absent;
    assert_eq!(SpreadsheetFields::of(&p).spreadsheet, None);
    assert_eq!(PinFields::of(&p).spreadsheet, None);
}

#[test]
fn archive_index_is_stable_and_in_range() {
    let first = archive_index("1187654321098765432", 3);
    assert_eq!(first, archive_index("1187654321098765432", 3));
    for id in ["a", "b", "c", "d", "e", "f"] {
        assert!(archive_index(id, 3) < 3);
    }
    assert_eq!(archive_index("anything", 0), 0);
}

#[parameterized(
    first = { 0, "Solved A" },
    third = { 2, "Solved C" },
    last_single = { 25, "Solved Z" },
    first_double = { 26, "Solved AA" },
    second_double = { 27, "Solved AB" },
    last_double = { 701, "Solved ZZ" },
    first_triple = { 702, "Solved AAA" },
)]
fn archive_categories_are_lettered(index: usize, expected: &str) {
    assert_eq!(archive_category_name(index), expected);
}

#[test]
fn archive_category_names_are_distinct() {
    let names: std::collections::HashSet<_> = (0..100).map(archive_category_name).collect();
    assert_eq!(names.len(), 100);
}

#[parameterized(
    channel = { PuzzleFacet::Channel, Facet::Channel, "channel" },
    voice_room = { PuzzleFacet::VoiceRoom, Facet::VoiceRoom, "voice_room" },
    position = { PuzzleFacet::Position, Facet::Position, "position" },
)]
fn puzzle_facets_report_as_facets(facet: PuzzleFacet, expected: Facet, name: &str) {
    assert_eq!(Facet::from(facet), expected);
    assert_eq!(facet.to_string(), name);
}

#[parameterized(
    category = { RoundFacet::Category, Facet::Category, "category" },
    folder = { RoundFacet::Folder, Facet::Folder, "folder" },
    position = { RoundFacet::Position, Facet::Position, "position" },
)]
fn round_facets_report_as_facets(facet: RoundFacet, expected: Facet, name: &str) {
    assert_eq!(Facet::from(facet), expected);
    assert_eq!(facet.to_string(), name);
}
