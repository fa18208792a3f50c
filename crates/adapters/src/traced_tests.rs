// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::chat::{ChatCall, FakeChatAdapter};
use crate::docs::{DocsCall, FakeDocsAdapter};
use crate::publish::FakePublisher;
use huntsync_core::{ChangeId, ChangeKind};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_chat_create_channel_logs_span_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedChatAdapter::new(FakeChatAdapter::new());
        traced.create_channel("alpha", None).await
    });

    assert!(result.is_ok(), "create should succeed: {:?}", result);
    assert!(
        logs.contains("chat.create_channel"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("alpha"),
        "Should log channel name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("channel created"),
        "Should log completion. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("elapsed_ms"),
        "Should log timing. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_chat_logs_failures() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedChatAdapter::new(FakeChatAdapter::new());
        traced.set_channel_name("chan-404", "alpha").await
    });

    assert!(matches!(result, Err(ChatError::NotFound(_))));
    assert!(
        logs.contains("failed") && logs.contains("unknown resource: chan-404"),
        "Should log the error. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_chat_warns_when_rate_limited() {
    let (logs, retry_after) = with_tracing(|| async {
        let fake = FakeChatAdapter::new();
        let at = Utc::now();
        fake.rate_limit("chan-1", at, std::time::Duration::ZERO);
        TracedChatAdapter::new(fake).check_rate_limit("chan-1")
    });

    assert!(retry_after.is_some());
    assert!(
        logs.contains("rate limited"),
        "Should warn about rate limiting. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_docs_create_sheet_logs_operation() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedDocsAdapter::new(FakeDocsAdapter::new());
        traced.create_sheet("Alpha").await
    });

    assert!(result.is_ok());
    assert!(
        logs.contains("docs.create_sheet"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("spreadsheet created"),
        "Should log completion. Logs:\n{}",
        logs
    );
}

// =============================================================================
// Delegation tests - verify traced wrapper delegates to inner adapter
// =============================================================================

#[tokio::test]
async fn traced_chat_delegates_to_inner() {
    let fake = FakeChatAdapter::new();
    let traced = TracedChatAdapter::new(fake.clone());

    let category = traced.create_category("Cavern").await.unwrap();
    traced
        .create_channel("alpha", Some(&category))
        .await
        .unwrap();

    let calls = fake.calls();
    assert_eq!(calls.len(), 2);
    match &calls[1] {
        ChatCall::CreateChannel { name, category: c } => {
            assert_eq!(name, "alpha");
            assert_eq!(c.as_deref(), Some(category.as_str()));
        }
        other => panic!("Expected CreateChannel call, got {:?}", other),
    }
}

#[tokio::test]
async fn traced_docs_delegates_to_inner() {
    let fake = FakeDocsAdapter::new();
    let traced = TracedDocsAdapter::new(fake.clone());

    let folder = traced.create_folder("Cavern").await.unwrap();
    traced.set_folder_name(&folder, "Grotto").await.unwrap();

    assert_eq!(
        fake.calls().last(),
        Some(&DocsCall::SetFolderName {
            id: folder,
            name: "Grotto".to_string(),
        })
    );
}

#[tokio::test]
async fn traced_publisher_delegates_to_inner() {
    let fake = FakePublisher::new();
    let traced = TracedPublisher::new(fake.clone());
    let message = SyncMessage {
        change_id: ChangeId(7),
        kind: ChangeKind::Delete,
        puzzle: None,
        round: None,
    };

    traced.publish(&message).await.unwrap();
    assert_eq!(fake.published(), vec![message]);
}
