use folio::resolve::resolve;
use folio::staging::PendingChangeStore;
use folio::tree::node::compare_nodes;
use folio::tree::{find_node_by_path, merge_tree, TreeNode};
use folio::types::PendingChange;
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

const FILES: &[&str] = &[
    "README.md",
    "notes.md",
    "docs/guide.md",
    "docs/api.md",
    "docs/deep/ref.md",
    "Assets/logo.png",
];
const DIRS: &[&str] = &["docs", "docs/deep", "Assets", "fresh"];

fn file_path() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(FILES).prop_map(str::to_string),
        // New files, plus paths where a moved folder's files can land.
        prop::sample::select(vec![
            "fresh/new.md",
            "docs/new.md",
            "Zed.md",
            "fresh/guide.md",
            "fresh/deep/ref.md",
            "Assets/api.md",
            "docs/deep/guide.md",
        ])
        .prop_map(str::to_string),
    ]
}

/// Changes that only touch files, never folders.
fn file_change() -> impl Strategy<Value = PendingChange> {
    prop_oneof![
        (file_path(), "[a-z]{0,8}").prop_map(|(p, c)| PendingChange::create(p, c)),
        (file_path(), "[a-z]{0,8}").prop_map(|(p, c)| PendingChange::modify(p, c)),
        file_path().prop_map(PendingChange::delete),
        (file_path(), file_path()).prop_map(|(p, o)| PendingChange::move_file(p, o)),
    ]
}

fn any_change() -> impl Strategy<Value = PendingChange> {
    prop_oneof![
        4 => file_change(),
        1 => (prop::sample::select(DIRS), prop::sample::select(DIRS))
            .prop_map(|(p, o)| PendingChange::move_folder(p, o)),
    ]
}

fn remote() -> TreeNode {
    TreeNode::from_file_paths(FILES.iter().copied())
}

fn collect_paths<'a>(node: &'a TreeNode, out: &mut Vec<&'a str>) {
    for child in &node.children {
        out.push(&child.path);
        collect_paths(child, out);
    }
}

fn assert_sorted(node: &TreeNode) {
    for pair in node.children.windows(2) {
        assert_ne!(compare_nodes(&pair[0], &pair[1]), Ordering::Greater);
    }
    for child in &node.children {
        assert_sorted(child);
    }
}

proptest! {
    #[test]
    fn store_keeps_one_entry_per_path_last_write_wins(
        changes in prop::collection::vec(file_change(), 0..24)
    ) {
        let store = PendingChangeStore::new();
        let mut expected: HashMap<String, PendingChange> = HashMap::new();
        for change in changes {
            let merged = match (expected.get(change.path()), &change) {
                (Some(PendingChange::Delete { .. }), PendingChange::Create { path, content }) => {
                    PendingChange::modify(path.clone(), content.clone())
                }
                _ => change.clone(),
            };
            expected.insert(change.path().to_string(), merged);
            store.add_change(change);
        }

        let stored = store.get_changes();
        let keys: HashSet<&str> = stored.iter().map(|c| c.path()).collect();
        prop_assert_eq!(keys.len(), stored.len());
        prop_assert_eq!(stored.len(), expected.len());
        for change in &stored {
            prop_assert_eq!(Some(change), expected.get(change.path()));
        }
    }

    #[test]
    fn overlay_has_unique_sorted_paths(
        changes in prop::collection::vec(any_change(), 0..16)
    ) {
        let store = PendingChangeStore::new();
        for change in changes {
            store.add_change(change);
        }
        let merged = merge_tree(&remote(), &store.get_changes());

        let mut paths = Vec::new();
        collect_paths(&merged, &mut paths);
        let unique: HashSet<&str> = paths.iter().copied().collect();
        prop_assert_eq!(unique.len(), paths.len());
        assert_sorted(&merged);
    }

    #[test]
    fn pending_delete_hides_file(
        changes in prop::collection::vec(any_change(), 0..16)
    ) {
        let store = PendingChangeStore::new();
        for change in changes {
            store.add_change(change);
        }
        let staged = store.get_changes();
        let merged = merge_tree(&remote(), &staged);
        for change in &staged {
            if let PendingChange::Delete { path } = change {
                prop_assert!(find_node_by_path(&merged, path).is_none());
            }
        }
    }

    #[test]
    fn relative_resolution_never_leaves_parent_segments(
        climbs in 0usize..5,
        dot_prefix in any::<bool>(),
        rest in prop::collection::vec("[a-z]{1,6}", 1..4),
        base in prop::collection::vec("[a-z]{1,6}", 1..4),
    ) {
        let prefix = if climbs == 0 && dot_prefix {
            "./".to_string()
        } else {
            "../".repeat(climbs)
        };
        let reference = format!("{}{}", prefix, rest.join("/"));
        let base = base.join("/");

        let resolved = resolve(&reference, Some(&base));
        prop_assert!(resolved.starts_with('/'));
        prop_assert!(!resolved.contains("/../"));
        prop_assert!(!resolved.contains("/./"));
        prop_assert!(resolved.ends_with(rest.last().map(String::as_str).unwrap_or_default()));
    }
}
