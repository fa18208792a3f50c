// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the external systems puzzles and rounds are mirrored into

pub mod chat;
pub mod docs;
pub mod publish;
pub mod traced;

pub use chat::{
    ChatAdapter, ChatError, NoOpChatAdapter, PinField, PinnedMessage, VoiceEvent,
    MANAGED_EVENT_DESCRIPTION,
};
pub use docs::{DocsAdapter, DocsError, NoOpDocsAdapter};
pub use publish::{NoOpPublisher, PublishError, Publisher};
pub use traced::{TracedChatAdapter, TracedDocsAdapter, TracedPublisher};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use chat::{ChatCall, FakeChannel, FakeChatAdapter, SentMessage};
#[cfg(any(test, feature = "test-support"))]
pub use docs::{DocsCall, FakeDocsAdapter, FakeFile};
#[cfg(any(test, feature = "test-support"))]
pub use publish::FakePublisher;
