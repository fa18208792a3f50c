// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change-name patterns and subscriptions

/// One `:`-separated piece of a pattern
#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Exact(String),
    /// `*`: any single segment
    One,
    /// `**`: everything from here on
    Rest,
}

/// Pattern over change names such as `puzzle:updated`.
///
/// `puzzle:*` matches every puzzle change, `round:**` every round change,
/// and a bare `*` or `**` matches everything. An empty pattern matches
/// nothing.
#[derive(Clone, Debug)]
pub struct EventPattern {
    source: String,
    segments: Vec<Segment>,
}

impl EventPattern {
    pub fn new(pattern: &str) -> Self {
        let segments = match pattern {
            "" => Vec::new(),
            "*" | "**" => vec![Segment::Rest],
            _ => pattern
                .split(':')
                .map(|part| match part {
                    "*" => Segment::One,
                    "**" => Segment::Rest,
                    exact => Segment::Exact(exact.to_string()),
                })
                .collect(),
        };
        Self {
            source: pattern.to_string(),
            segments,
        }
    }

    pub fn matches(&self, event_name: &str) -> bool {
        if self.segments.is_empty() {
            return false;
        }
        let mut parts = event_name.split(':');
        for segment in &self.segments {
            match (segment, parts.next()) {
                (Segment::Rest, _) => return true,
                (Segment::One, Some(_)) => {}
                (Segment::Exact(want), Some(part)) if want == part => {}
                _ => return false,
            }
        }
        parts.next().is_none()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Names a consumer queue on the bus
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub String);

/// A consumer's interest in changes
#[derive(Clone, Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub patterns: Vec<EventPattern>,
    pub description: String,
}

impl Subscription {
    pub fn new(
        id: impl Into<String>,
        patterns: Vec<EventPattern>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: SubscriberId(id.into()),
            patterns,
            description: description.into(),
        }
    }

    /// Every change to every entity
    pub fn all(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(id, vec![EventPattern::new("*")], description)
    }

    /// Every change to one entity type, e.g. `"round"`
    pub fn entity(
        id: impl Into<String>,
        entity: &str,
        description: impl Into<String>,
    ) -> Self {
        Self::new(id, vec![EventPattern::new(&format!("{}:*", entity))], description)
    }

    pub fn matches(&self, event_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(event_name))
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
