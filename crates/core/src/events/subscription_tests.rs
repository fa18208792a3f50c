// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn exact_pattern_matches_exact_event() {
    let pattern = EventPattern::new("puzzle:updated");
    assert!(pattern.matches("puzzle:updated"));
    assert!(!pattern.matches("puzzle:deleted"));
    assert!(!pattern.matches("round:updated"));
}

#[test]
fn wildcard_matches_single_segment() {
    let pattern = EventPattern::new("puzzle:*");
    assert!(pattern.matches("puzzle:created"));
    assert!(pattern.matches("puzzle:deleted"));
    assert!(!pattern.matches("round:created"));
    assert!(!pattern.matches("puzzle:handle:assigned")); // * doesn't match multiple segments
}

#[test]
fn double_wildcard_matches_everything_after() {
    let pattern = EventPattern::new("round:**");
    assert!(pattern.matches("round:created"));
    assert!(pattern.matches("round:handle:assigned"));
    assert!(!pattern.matches("puzzle:created"));
}

#[test]
fn global_wildcards() {
    let star = EventPattern::new("*");
    let double_star = EventPattern::new("**");

    assert!(star.matches("anything"));
    assert!(double_star.matches("anything:here:too"));
}

#[test]
fn empty_pattern_matches_nothing() {
    assert!(!EventPattern::new("").matches("puzzle:created"));
}

#[test]
fn subscription_matches_any_pattern() {
    let sub = Subscription::new(
        "test-sub",
        vec![
            EventPattern::new("puzzle:updated"),
            EventPattern::new("round:**"),
        ],
        "Test subscription",
    );

    assert!(sub.matches("puzzle:updated"));
    assert!(sub.matches("round:deleted"));
    assert!(!sub.matches("puzzle:created"));
}

#[test]
fn entity_subscription_covers_every_verb() {
    let sub = Subscription::entity("round-watcher", "round", "Watch rounds");

    assert_eq!(sub.patterns[0].as_str(), "round:*");
    for verb in ["created", "updated", "deleted"] {
        assert!(sub.matches(&format!("round:{}", verb)));
    }
    assert!(!sub.matches("puzzle:updated"));
}
