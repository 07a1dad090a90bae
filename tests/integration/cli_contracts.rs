use clap::{CommandFactory, Parser};
use folio::remote::MemoryRemote;
use folio::session::EditSession;
use folio::tooling::cli::{Cli, CliContext, Commands};
use std::sync::Arc;

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["folio", "tree"],
        vec!["folio", "tree", "--changes", "plan.toml", "--format", "json"],
        vec!["folio", "cat", "docs/guide.md"],
        vec!["folio", "--branch", "drafts", "status"],
        vec!["folio", "branches"],
        vec!["folio", "search", "guide"],
        vec!["folio", "search", "TODO", "--content"],
        vec!["folio", "resolve", "../a.md", "--document", "docs/b.md"],
        vec!["folio", "resolve", "img/x.png", "--asset"],
        vec!["folio", "commit", "--changes", "plan.toml", "-m", "msg"],
        vec![
            "folio",
            "--remote",
            "http://localhost:9000",
            "--log-level",
            "debug",
            "commit",
            "--changes",
            "plan.json",
            "--message",
            "msg",
            "--dry-run",
        ],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_incomplete_commands() {
    assert!(Cli::try_parse_from(["folio", "commit", "-m", "msg"]).is_err());
    assert!(Cli::try_parse_from(["folio", "commit", "--changes", "p.toml"]).is_err());
    assert!(Cli::try_parse_from(["folio", "cat"]).is_err());
    assert!(Cli::try_parse_from(["folio"]).is_err());
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

fn context() -> CliContext {
    let remote = Arc::new(MemoryRemote::new("main").with_files([
        ("README.md", "hello"),
        ("docs/guide.md", "Guide\nsecond line mentions TODO\nthird"),
    ]));
    CliContext::with_session(EditSession::new(remote, None)).unwrap()
}

#[test]
fn status_and_branches_render_tables() {
    let ctx = context();
    let status = ctx.execute(&Commands::Status).unwrap();
    assert!(status.contains("main"));
    assert!(status.contains("memory"));

    let branches = ctx.execute(&Commands::Branches).unwrap();
    assert!(branches.contains("main"));
    assert!(branches.contains('*'));
}

#[test]
fn content_search_reports_line_numbers() {
    let ctx = context();
    let output = ctx
        .execute(&Commands::Search {
            query: "todo".into(),
            content: true,
        })
        .unwrap();
    assert!(output.contains("docs/guide.md"));
    assert!(output.contains("second line mentions TODO"));
}

#[test]
fn missing_document_is_reported() {
    let ctx = context();
    let err = ctx
        .execute(&Commands::Cat {
            path: "nope.md".into(),
            changes: None,
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "File not found: nope.md");
}
