use folio::commit::{CommitPipeline, RemoteOp};
use folio::error::{ApiError, ValidationError};
use folio::remote::{CallKind, MemoryRemote, RemoteCall};
use folio::staging::PendingChangeStore;
use folio::types::PendingChange;
use std::sync::Arc;

#[tokio::test]
async fn deletes_then_moves_then_writes_then_commit() {
    let remote = Arc::new(MemoryRemote::new("main").with_files([
        ("a.md", "a"),
        ("b.md", "b"),
        ("old/x.md", "x"),
    ]));
    let store = PendingChangeStore::new();
    let pipeline = CommitPipeline::new(store.clone(), remote.clone());

    let changes = vec![
        PendingChange::create("c.md", "c"),
        PendingChange::move_folder("new", "old"),
        PendingChange::delete("a.md"),
        PendingChange::move_file("b2.md", "b.md"),
        PendingChange::modify("b2.md", "ignored by store, kept by pipeline"),
    ];
    pipeline.commit(&changes, "Mixed").await.unwrap();

    assert_eq!(
        remote.mutating_calls(),
        vec![
            RemoteCall::Delete { path: "a.md".into() },
            RemoteCall::MoveFolder { from: "old".into(), to: "new".into() },
            RemoteCall::Move { from: "b.md".into(), to: "b2.md".into() },
            RemoteCall::Write { path: "c.md".into(), content: "c".into() },
            RemoteCall::Write {
                path: "b2.md".into(),
                content: "ignored by store, kept by pipeline".into()
            },
            RemoteCall::Commit { message: "Mixed".into() },
        ]
    );
    assert_eq!(remote.file("new/x.md").as_deref(), Some("x"));
}

#[tokio::test]
async fn validation_happens_before_remote_calls() {
    let remote = Arc::new(MemoryRemote::new("main"));
    let pipeline = CommitPipeline::new(PendingChangeStore::new(), remote.clone());

    let err = pipeline
        .commit(&[PendingChange::delete("a.md")], "\n\t ")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(ValidationError::EmptyMessage)));
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn first_failure_stops_the_run() {
    let remote = Arc::new(MemoryRemote::new("main").with_files([("a.md", "a")]));
    remote.fail_on(CallKind::Delete, "locked");
    let store = PendingChangeStore::new();
    store.add_change(PendingChange::delete("a.md"));
    store.add_change(PendingChange::create("b.md", "b"));
    let pipeline = CommitPipeline::new(store.clone(), remote.clone());

    let err = pipeline.commit(&store.get_changes(), "Go").await.unwrap_err();
    assert_eq!(err.to_string(), "failed to delete a.md: locked");
    assert_eq!(remote.mutating_calls().len(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn plan_is_stable_within_each_phase() {
    let changes = vec![
        PendingChange::create("z.md", ""),
        PendingChange::create("a.md", ""),
        PendingChange::delete("y.md"),
        PendingChange::delete("b.md"),
    ];
    let plan = CommitPipeline::plan(&changes);
    let rendered: Vec<String> = plan.iter().map(RemoteOp::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "delete y.md",
            "delete b.md",
            "write z.md (0 bytes)",
            "write a.md (0 bytes)",
        ]
    );
}
