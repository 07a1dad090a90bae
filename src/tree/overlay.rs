//! Tree overlay
//!
//! Derives the tree a consumer should render from an immutable remote
//! snapshot and the current staging log. Pending deletes and moved-away
//! sources are hidden, creates and move targets are inserted into their
//! ancestor directory at any depth, and every level is sorted directories
//! first, then case-insensitively by name.
//!
//! Recomputed on every render; never mutates its input.

use super::node::{find_node_by_path, sort_recursive, TreeNode};
use super::path;
use crate::types::PendingChange;
use std::collections::HashSet;

/// Merge a remote snapshot's root children with pending changes.
pub fn merge(remote_children: &[TreeNode], changes: &[PendingChange]) -> Vec<TreeNode> {
    let mut hidden: HashSet<&str> = HashSet::new();
    for change in changes {
        match change {
            PendingChange::Delete { path } => {
                hidden.insert(path.as_str());
            }
            PendingChange::Move { old_path, .. } | PendingChange::MoveFolder { old_path, .. } => {
                hidden.insert(old_path.as_str());
            }
            PendingChange::Create { .. } | PendingChange::Modify { .. } => {}
        }
    }

    let mut merged = filter_hidden(remote_children, &hidden);

    // Folders first, so files staged inside a moved folder land in its subtree.
    for (idx, change) in changes.iter().enumerate() {
        if let PendingChange::MoveFolder { path, old_path } = change {
            let source = remote_location(old_path, &changes[..idx]);
            let children = relocated_children(remote_children, &source, path, &hidden);
            insert_node(&mut merged, TreeNode::dir(path, children));
        }
    }
    for change in changes {
        if let PendingChange::Create { path, .. } | PendingChange::Move { path, .. } = change {
            insert_node(&mut merged, TreeNode::file(path));
        }
    }

    sort_recursive(&mut merged);
    merged
}

/// Merge a whole snapshot, returning a new root.
pub fn merge_tree(root: &TreeNode, changes: &[PendingChange]) -> TreeNode {
    TreeNode {
        name: root.name.clone(),
        path: root.path.clone(),
        is_dir: root.is_dir,
        children: merge(&root.children, changes),
    }
}

fn filter_hidden(nodes: &[TreeNode], hidden: &HashSet<&str>) -> Vec<TreeNode> {
    nodes
        .iter()
        .filter(|node| !hidden.contains(node.path.as_str()))
        .map(|node| TreeNode {
            name: node.name.clone(),
            path: node.path.clone(),
            is_dir: node.is_dir,
            children: filter_hidden(&node.children, hidden),
        })
        .collect()
}

/// Where `target` lives in the remote snapshot, undoing the folder moves
/// staged before it.
fn remote_location(target: &str, earlier: &[PendingChange]) -> String {
    let mut location = target.to_string();
    for change in earlier.iter().rev() {
        if let PendingChange::MoveFolder { path, old_path } = change {
            location = path::rebase(&location, path, old_path);
        }
    }
    location
}

/// Children of the remote folder at `from`, re-rooted under `to`.
///
/// A node is dropped when either its remote path or its relocated path is
/// hidden, so deletes staged on both sides of the move apply.
fn relocated_children(
    remote_children: &[TreeNode],
    from: &str,
    to: &str,
    hidden: &HashSet<&str>,
) -> Vec<TreeNode> {
    let source = remote_children
        .iter()
        .find_map(|node| find_node_by_path(node, from));
    match source {
        Some(folder) if folder.is_dir => relocate(&folder.children, from, to, hidden),
        _ => Vec::new(),
    }
}

fn relocate(nodes: &[TreeNode], from: &str, to: &str, hidden: &HashSet<&str>) -> Vec<TreeNode> {
    nodes
        .iter()
        .filter_map(|node| {
            let rebased = path::rebase(&node.path, from, to);
            if hidden.contains(node.path.as_str()) || hidden.contains(rebased.as_str()) {
                return None;
            }
            Some(TreeNode {
                name: node.name.clone(),
                path: rebased,
                is_dir: node.is_dir,
                children: relocate(&node.children, from, to, hidden),
            })
        })
        .collect()
}

/// Insert `node` under its ancestors, synthesizing missing directories.
/// A node whose path is already present is dropped, as is one whose
/// ancestor slot is occupied by a file.
fn insert_node(level: &mut Vec<TreeNode>, node: TreeNode) {
    let mut current = level;
    for ancestor in path::ancestors(&node.path) {
        let idx = match current.iter().position(|n| n.path == ancestor) {
            Some(idx) if current[idx].is_dir => idx,
            Some(_) => return,
            None => {
                current.push(TreeNode::dir(ancestor, Vec::new()));
                current.len() - 1
            }
        };
        current = &mut current[idx].children;
    }
    if current.iter().any(|n| n.path == node.path) {
        return;
    }
    current.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::extract_all_paths;

    fn remote() -> TreeNode {
        TreeNode::from_file_paths([
            "README.md",
            "b.md",
            "docs/guide.md",
            "docs/api/v1.md",
            "Zeta/z.md",
        ])
    }

    fn names(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn delete_hides_remote_node() {
        let merged = merge(&remote().children, &[PendingChange::delete("README.md")]);
        assert!(!names(&merged).contains(&"README.md"));
    }

    #[test]
    fn nested_delete_hides_nested_node() {
        let root = merge_tree(&remote(), &[PendingChange::delete("docs/api/v1.md")]);
        assert!(find_node_by_path(&root, "docs/api/v1.md").is_none());
        assert!(find_node_by_path(&root, "docs/api").is_some());
    }

    #[test]
    fn create_at_root_is_inserted_sorted() {
        let merged = merge(&remote().children, &[PendingChange::create("a.md", "")]);
        assert_eq!(names(&merged), vec!["docs", "Zeta", "a.md", "b.md", "README.md"]);
    }

    #[test]
    fn create_is_nested_under_existing_directory() {
        let root = merge_tree(&remote(), &[PendingChange::create("docs/new.md", "")]);
        let docs = find_node_by_path(&root, "docs").unwrap();
        assert_eq!(names(&docs.children), vec!["api", "guide.md", "new.md"]);
        assert!(!names(&root.children).contains(&"new.md"));
    }

    #[test]
    fn create_synthesizes_missing_directories() {
        let root = merge_tree(&remote(), &[PendingChange::create("notes/2024/jan.md", "")]);
        let notes = find_node_by_path(&root, "notes").unwrap();
        assert!(notes.is_dir);
        let year = find_node_by_path(&root, "notes/2024").unwrap();
        assert!(year.is_dir);
        assert_eq!(year.children[0].path, "notes/2024/jan.md");
        assert_eq!(names(&root.children)[0], "docs");
        assert_eq!(names(&root.children)[1], "notes");
    }

    #[test]
    fn create_of_existing_path_is_not_duplicated() {
        let root = merge_tree(&remote(), &[PendingChange::create("docs/guide.md", "x")]);
        let paths = extract_all_paths(&root);
        assert_eq!(paths.iter().filter(|p| *p == "docs/guide.md").count(), 1);
    }

    #[test]
    fn move_relocates_file() {
        let root = merge_tree(&remote(), &[PendingChange::move_file("docs/readme.md", "README.md")]);
        assert!(find_node_by_path(&root, "README.md").is_none());
        assert!(find_node_by_path(&root, "docs/readme.md").is_some());
    }

    #[test]
    fn move_folder_carries_subtree() {
        let root = merge_tree(&remote(), &[PendingChange::move_folder("manual", "docs")]);
        assert!(find_node_by_path(&root, "docs").is_none());
        let manual = find_node_by_path(&root, "manual").unwrap();
        assert!(manual.is_dir);
        assert!(find_node_by_path(&root, "manual/api/v1.md").is_some());
        assert!(find_node_by_path(&root, "manual/guide.md").is_some());
    }

    #[test]
    fn move_folder_respects_deletes_inside_source() {
        let changes = vec![
            PendingChange::delete("docs/guide.md"),
            PendingChange::move_folder("manual", "docs"),
        ];
        let root = merge_tree(&remote(), &changes);
        assert!(find_node_by_path(&root, "manual/guide.md").is_none());
        assert!(find_node_by_path(&root, "manual/api/v1.md").is_some());
    }

    #[test]
    fn delete_at_relocated_path_hides_moved_file() {
        let changes = vec![
            PendingChange::move_folder("manual", "docs"),
            PendingChange::delete("manual/guide.md"),
        ];
        let root = merge_tree(&remote(), &changes);
        assert!(find_node_by_path(&root, "manual/guide.md").is_none());
        assert!(find_node_by_path(&root, "manual/api/v1.md").is_some());

        let nested = vec![
            PendingChange::move_folder("manual", "docs"),
            PendingChange::delete("manual/api"),
        ];
        let root = merge_tree(&remote(), &nested);
        assert!(find_node_by_path(&root, "manual/api").is_none());
        assert!(find_node_by_path(&root, "manual/guide.md").is_some());
    }

    #[test]
    fn create_staged_before_folder_move_keeps_moved_subtree() {
        let changes = vec![
            PendingChange::create("manual/new.md", ""),
            PendingChange::move_folder("manual", "docs"),
        ];
        let root = merge_tree(&remote(), &changes);
        let manual = find_node_by_path(&root, "manual").unwrap();
        assert_eq!(names(&manual.children), vec!["api", "guide.md", "new.md"]);
    }

    #[test]
    fn nested_folder_move_reads_from_remote_location() {
        let changes = vec![
            PendingChange::move_folder("manual", "docs"),
            PendingChange::move_folder("manual/ref", "manual/api"),
        ];
        let root = merge_tree(&remote(), &changes);
        assert!(find_node_by_path(&root, "manual/api").is_none());
        assert!(find_node_by_path(&root, "manual/ref/v1.md").is_some());
        assert!(find_node_by_path(&root, "manual/guide.md").is_some());
    }

    #[test]
    fn modify_does_not_change_shape() {
        let before = remote();
        let after = merge_tree(&before, &[PendingChange::modify("b.md", "new")]);
        assert_eq!(before, after);
    }

    #[test]
    fn insertion_under_a_file_is_dropped() {
        let root = merge_tree(&remote(), &[PendingChange::create("b.md/inner.md", "")]);
        assert!(find_node_by_path(&root, "b.md/inner.md").is_none());
        assert!(!find_node_by_path(&root, "b.md").unwrap().is_dir);
    }
}
