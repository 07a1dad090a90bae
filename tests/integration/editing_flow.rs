use folio::remote::{CallKind, MemoryRemote, RemoteCall};
use folio::session::{BranchSwitchPolicy, EditSession};
use folio::tree::{extract_all_paths, find_node_by_path};
use folio::types::PendingChange;
use std::sync::Arc;

fn remote() -> Arc<MemoryRemote> {
    Arc::new(
        MemoryRemote::new("main")
            .with_files([
                ("README.md", "# Project\n\nSee [guide](docs/guide.md)."),
                ("docs/guide.md", "# Guide\n![diagram](img/flow.png)"),
                ("docs/img/flow.png", "png"),
                ("archive/2023.md", "old"),
            ])
            .with_branch("drafts", [("draft.md", "wip")]),
    )
}

#[tokio::test]
async fn staged_edits_show_up_everywhere_before_commit() {
    let remote = remote();
    let session = EditSession::new(remote.clone(), None);

    session.stage_edit("README.md", "# Project v2");
    session.stage_create_file("docs/faq.md").await.unwrap();
    session.stage_delete("archive/2023.md");

    assert_eq!(session.open_document("README.md").await.unwrap(), "# Project v2");

    let tree = session.tree().await.unwrap();
    let paths = extract_all_paths(&tree);
    assert!(paths.contains(&"docs/faq.md".to_string()));
    assert!(!paths.contains(&"archive/2023.md".to_string()));
    // Nothing has been written yet.
    assert!(remote.mutating_calls().is_empty());
    assert_eq!(remote.file("README.md").as_deref(), Some("# Project\n\nSee [guide](docs/guide.md)."));
}

#[tokio::test]
async fn commit_applies_every_staged_edit_in_order() {
    let remote = remote();
    let session = EditSession::new(remote.clone(), None);

    session.stage_create_file("docs/faq.md").await.unwrap();
    session.stage_rename("archive", "history").await.unwrap();
    session.stage_delete("README.md");

    let result = session.commit("Restructure").await.unwrap();
    assert_eq!((result.deleted, result.moved, result.written), (1, 1, 1));

    let kinds: Vec<CallKind> = remote.mutating_calls().iter().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        vec![CallKind::Delete, CallKind::MoveFolder, CallKind::Write, CallKind::Commit]
    );
    assert_eq!(remote.file("history/2023.md").as_deref(), Some("old"));
    assert!(remote.file("README.md").is_none());
    assert!(session.store().is_empty());

    let tree = session.tree().await.unwrap();
    assert!(find_node_by_path(&tree, "history/2023.md").is_some());
    assert!(find_node_by_path(&tree, "archive").is_none());
}

#[tokio::test]
async fn partial_failure_keeps_pending_log_for_retry() {
    let remote = remote();
    let session = EditSession::new(remote.clone(), None);
    session.stage_delete("archive/2023.md");
    session.stage_edit("README.md", "retry me");

    remote.fail_on_path(CallKind::Write, "README.md", "service unavailable");
    let err = session.commit("First try").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to write README.md: service unavailable"
    );
    // The delete went through and is not rolled back.
    assert!(remote.file("archive/2023.md").is_none());
    assert_eq!(session.store().len(), 2);
    assert!(!remote
        .calls()
        .iter()
        .any(|c| matches!(c, RemoteCall::Commit { .. })));
}

#[tokio::test]
async fn create_over_pending_delete_becomes_modify() {
    let remote = remote();
    let session = EditSession::new(remote.clone(), None);
    session.stage_delete("README.md");
    session.store().add_change(PendingChange::create("README.md", "fresh"));

    assert_eq!(
        session.store().get_changes(),
        vec![PendingChange::modify("README.md", "fresh")]
    );
    assert_eq!(session.open_document("README.md").await.unwrap(), "fresh");
}

#[tokio::test]
async fn switching_branch_requires_explicit_discard() {
    let remote = remote();
    let mut session = EditSession::new(remote.clone(), None);
    session.stage_edit("README.md", "unsaved");

    assert!(session
        .switch_branch("drafts", BranchSwitchPolicy::Refuse)
        .is_err());
    assert_eq!(session.store().len(), 1);

    session
        .switch_branch("drafts", BranchSwitchPolicy::Discard)
        .unwrap();
    assert_eq!(session.open_document("draft.md").await.unwrap(), "wip");
}

#[test]
fn document_links_resolve_relative_to_their_folder() {
    let session = EditSession::new(remote(), None);
    assert_eq!(
        session.resolve_asset("img/flow.png", Some("docs/guide.md")),
        "/api/file/docs/img/flow.png"
    );
    assert_eq!(
        session.resolve_link("docs/guide.md", Some("README.md")),
        "/docs/guide.md"
    );
    assert_eq!(
        session.resolve_link("https://example.com", Some("README.md")),
        "https://example.com"
    );
}
