//! Repository tree nodes and traversal helpers

use super::path;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// File or directory in a repository tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    /// Always empty for files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn file(path: &str) -> Self {
        Self {
            name: path::basename(path).to_string(),
            path: path.to_string(),
            is_dir: false,
            children: Vec::new(),
        }
    }

    pub fn dir(path: &str, children: Vec<TreeNode>) -> Self {
        Self {
            name: path::basename(path).to_string(),
            path: path.to_string(),
            is_dir: true,
            children,
        }
    }

    /// Unnamed root directory.
    pub fn root(children: Vec<TreeNode>) -> Self {
        Self::dir("", children)
    }

    /// Build a sorted tree from a list of file paths; directories are implicit.
    pub fn from_file_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = Self::root(Vec::new());
        for file in paths {
            let file = path::normalize(file.as_ref());
            if !file.is_empty() {
                insert_file_path(&mut root, &file);
            }
        }
        sort_recursive(&mut root.children);
        root
    }
}

fn insert_file_path(root: &mut TreeNode, file: &str) {
    let parts: Vec<&str> = file.split('/').collect();
    let mut current = root;
    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        let idx = match current.children.iter().position(|c| c.name == *part) {
            Some(idx) => idx,
            None => {
                let full = parts[..=i].join("/");
                let node = if is_last {
                    TreeNode::file(&full)
                } else {
                    TreeNode::dir(&full, Vec::new())
                };
                current.children.push(node);
                current.children.len() - 1
            }
        };
        current = &mut current.children[idx];
    }
}

/// Display order: directories before files, then case-insensitive by name.
pub fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Sort one level in display order.
pub fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(compare_nodes);
}

/// Sort every level in display order.
pub fn sort_recursive(nodes: &mut [TreeNode]) {
    sort_nodes(nodes);
    for node in nodes.iter_mut() {
        sort_recursive(&mut node.children);
    }
}

/// Depth-first search for the node at `target`; trailing slashes are ignored.
pub fn find_node_by_path<'a>(root: &'a TreeNode, target: &str) -> Option<&'a TreeNode> {
    let target = target.trim_end_matches('/');
    if root.path.trim_end_matches('/') == target {
        return Some(root);
    }
    root.children
        .iter()
        .find_map(|child| find_node_by_path(child, target))
}

/// Every file path in the tree, pre-order.
pub fn extract_all_paths(root: &TreeNode) -> Vec<String> {
    let mut out = Vec::new();
    collect_file_paths(root, &mut out);
    out
}

fn collect_file_paths(node: &TreeNode, out: &mut Vec<String>) {
    if !node.is_dir {
        if !node.path.is_empty() {
            out.push(node.path.clone());
        }
        return;
    }
    for child in &node.children {
        collect_file_paths(child, out);
    }
}
