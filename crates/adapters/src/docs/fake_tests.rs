// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_docs_sheet_moves_into_folder() {
    let docs = FakeDocsAdapter::new();

    let folder = docs.create_folder("Cavern").await.unwrap();
    let sheet = docs.create_sheet("Alpha").await.unwrap();
    docs.set_sheet_folder(&sheet, &folder).await.unwrap();
    docs.set_sheet_title(&sheet, "✅ Alpha").await.unwrap();

    let file = docs.file(&sheet).unwrap();
    assert_eq!(file.parent, Some(folder));
    assert_eq!(file.name, "✅ Alpha");
    assert_eq!(docs.calls().len(), 4);
}

#[tokio::test]
async fn fake_docs_deleted_folder_is_structural() {
    let docs = FakeDocsAdapter::new();
    let folder = docs.create_folder("Cavern").await.unwrap();
    let sheet = docs.create_sheet("Alpha").await.unwrap();
    docs.delete_file(&folder);

    let err = docs.set_sheet_folder(&sheet, &folder).await.unwrap_err();
    assert!(err.is_structural());
    let err = docs.set_folder_name(&sheet, "Grotto").await.unwrap_err();
    assert!(err.is_structural(), "a sheet is not a folder");
}

#[tokio::test]
async fn fake_docs_request_failure_is_not_structural() {
    let docs = FakeDocsAdapter::new();
    docs.fail_next("create_sheet", DocsError::Request("quota".to_string()));

    let err = docs.create_sheet("Alpha").await.unwrap_err();
    assert!(!err.is_structural());
    assert!(docs.create_sheet("Alpha").await.is_ok());
}
