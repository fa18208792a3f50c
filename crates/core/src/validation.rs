// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field-level validation errors

use thiserror::Error;

/// Bad input on a single field. Reported synchronously to the caller and
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn required(field: &str) -> Self {
        Self::new(field, "is required")
    }
}

/// Accepts absolute `http`/`https` URLs with a non-empty host
pub(crate) fn is_web_url(raw: &str) -> bool {
    let Some((scheme, rest)) = raw.split_once("://") else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return false;
    }
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    !host.is_empty() && !host.starts_with(':') && !raw.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        https = { "https://example.com/puzzles/alpha", true },
        http = { "http://x", true },
        upper_scheme = { "HTTPS://example.com", true },
        ftp = { "ftp://example.com", false },
        no_scheme = { "example.com/alpha", false },
        empty_host = { "https:///alpha", false },
        whitespace = { "https://exa mple.com", false },
    )]
    fn web_urls(raw: &str, expected: bool) {
        assert_eq!(is_web_url(raw), expected);
    }

    #[test]
    fn display_joins_field_and_message() {
        let err = ValidationError::new("puzzle_url", "is not a valid URL");
        assert_eq!(err.to_string(), "puzzle_url is not a valid URL");
    }
}
