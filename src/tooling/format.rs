//! Text rendering for CLI output.

use crate::commit::RemoteOp;
use crate::tree::TreeNode;
use crate::types::{BranchInfo, ChangeSummary, CommitResult, PendingChange, RepoStatus, SearchResults};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::collections::HashMap;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Indented tree listing; staged entries carry a change marker.
pub fn format_tree_text(root: &TreeNode, changes: &[PendingChange]) -> String {
    let marks: HashMap<&str, &PendingChange> = changes.iter().map(|c| (c.path(), c)).collect();
    let mut out = String::new();
    out.push_str(&format!("{}\n", format_section_heading("Tree")));
    if root.children.is_empty() {
        out.push_str("  (empty)\n");
        return out;
    }
    for child in &root.children {
        push_node(&mut out, child, 1, &marks);
    }
    out
}

fn push_node(out: &mut String, node: &TreeNode, depth: usize, marks: &HashMap<&str, &PendingChange>) {
    let indent = "  ".repeat(depth);
    let name = if node.is_dir {
        format!("{}/", node.name.bold())
    } else {
        node.name.clone()
    };
    let mark = match marks.get(node.path.as_str()) {
        Some(change) => format!(" {}", change_marker(change)),
        None => String::new(),
    };
    out.push_str(&format!("{}{}{}\n", indent, name, mark));
    for child in &node.children {
        push_node(out, child, depth + 1, marks);
    }
}

fn change_marker(change: &PendingChange) -> String {
    match change {
        PendingChange::Create { .. } => format!("{}", "[new]".green()),
        PendingChange::Modify { .. } => format!("{}", "[modified]".yellow()),
        PendingChange::Delete { .. } => format!("{}", "[deleted]".red()),
        PendingChange::Move { old_path, .. } | PendingChange::MoveFolder { old_path, .. } => {
            format!("{}", format!("[moved from {}]", old_path).cyan())
        }
    }
}

pub fn format_status_text(status: &RepoStatus) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Source", "Branch", "Uncommitted"]);
    table.add_row(vec![
        status.source.clone(),
        status.branch.clone(),
        if status.is_dirty { "yes" } else { "no" }.to_string(),
    ]);
    format!("{}\n\n{}\n", format_section_heading("Repository Status"), table)
}

pub fn format_branches_text(branches: &[BranchInfo]) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Branches"));
    if branches.is_empty() {
        out.push_str("No branches.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Branch", "Default"]);
    for branch in branches {
        table.add_row(vec![
            branch.name.clone(),
            if branch.is_default { "*" } else { "" }.to_string(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_search_text(query: &str, results: &SearchResults) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("Results for \"{}\"", query))
    );
    if results.is_empty() {
        out.push_str("No matches.\n");
        return out;
    }
    match results {
        SearchResults::Filenames(paths) => {
            for p in paths {
                out.push_str(&format!("  {}\n", p));
            }
        }
        SearchResults::Content(matches) => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["Path", "Line", "Text"]);
            for m in matches {
                let line = m
                    .context
                    .iter()
                    .find(|l| l.to_lowercase().contains(&m.match_text.to_lowercase()))
                    .cloned()
                    .unwrap_or_else(|| m.match_text.clone());
                table.add_row(vec![m.path.clone(), m.line_number.to_string(), line]);
            }
            out.push_str(&format!("{}\n", table));
        }
    }
    out
}

/// Dry-run listing of the calls a commit would make.
pub fn format_plan_text(ops: &[RemoteOp], changes: &[PendingChange]) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Commit Plan"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Call"]);
    for (idx, op) in ops.iter().enumerate() {
        table.add_row(vec![(idx + 1).to_string(), op.to_string()]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format_change_counts(changes));
    out
}

fn format_change_counts(changes: &[PendingChange]) -> String {
    let summary = ChangeSummary::from_changes(changes);
    format!(
        "{} created, {} modified, {} deleted, {} moved\n",
        summary.created, summary.modified, summary.deleted, summary.moved
    )
}

pub fn format_commit_text(result: &CommitResult) -> String {
    format!(
        "Committed {} ({} deleted, {} moved, {} written)",
        result.commit_id.green(),
        result.deleted,
        result.moved,
        result.written
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_text_marks_staged_entries() {
        let root = TreeNode::from_file_paths(["README.md", "docs/new.md"]);
        let changes = vec![PendingChange::create("docs/new.md", "")];
        let text = format_tree_text(&root, &changes);
        assert!(text.contains("README.md"));
        assert!(text.contains("new.md"));
        assert!(text.contains("[new]"));
        assert!(!text.contains("[modified]"));
    }

    #[test]
    fn plan_text_numbers_calls() {
        let ops = vec![
            RemoteOp::Delete { path: "a.md".into() },
            RemoteOp::Commit { message: "msg".into() },
        ];
        let text = format_plan_text(&ops, &[PendingChange::delete("a.md")]);
        assert!(text.contains("delete a.md"));
        assert!(text.contains("commit \"msg\""));
        assert!(text.contains("1 deleted"));
    }

    #[test]
    fn empty_search_says_so() {
        let text = format_search_text("zzz", &SearchResults::Filenames(Vec::new()));
        assert!(text.contains("No matches."));
    }
}
