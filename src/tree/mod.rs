//! Repository trees
//!
//! Tree snapshots as served by the remote, path helpers, and the overlay that
//! merges a snapshot with the staging log for display.

pub mod node;
pub mod overlay;
pub mod path;

pub use node::{extract_all_paths, find_node_by_path, sort_nodes, TreeNode};
pub use overlay::{merge, merge_tree};
