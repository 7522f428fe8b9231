//! Tree differencing
//!
//! Compares the previous run's hash tree with the current one. Comparison is
//! tree-shaped: a subtree whose root hash is unchanged is never visited.

use super::node::HashTreeNode;
use serde::Serialize;
use std::collections::HashSet;

/// Paths that changed between two hash trees.
///
/// The three lists are pairwise disjoint. The root path is never reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Paths whose current content must be pushed: added or modified.
    pub fn touched_paths(&self) -> HashSet<String> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .cloned()
            .collect()
    }
}

/// Diff two hash trees. With no previous tree every path is added.
pub fn diff(old: Option<&HashTreeNode>, new: &HashTreeNode) -> DiffResult {
    let mut result = DiffResult::default();
    match old {
        None => collect_paths(new, &mut result.added),
        Some(old) => diff_nodes(old, new, &mut result),
    }
    result
}

fn diff_nodes(old: &HashTreeNode, new: &HashTreeNode, result: &mut DiffResult) {
    if old.hash == new.hash {
        return;
    }

    for (name, new_child) in &new.children {
        let Some(old_child) = old.children.get(name) else {
            collect_paths(new_child, &mut result.added);
            continue;
        };
        if old_child.hash == new_child.hash {
            continue;
        }
        match (old_child.is_leaf(), new_child.is_leaf()) {
            (true, true) => result.modified.push(new_child.source_path.clone()),
            (true, false) | (false, true) => {
                // File became a directory or the other way around.
                result.modified.push(new_child.source_path.clone());
                diff_nodes(old_child, new_child, result);
            }
            (false, false) => diff_nodes(old_child, new_child, result),
        }
    }

    for (name, old_child) in &old.children {
        if !new.children.contains_key(name) {
            collect_paths(old_child, &mut result.deleted);
        }
    }
}

fn collect_paths(node: &HashTreeNode, paths: &mut Vec<String>) {
    node.walk(&mut |n| {
        if !n.source_path.is_empty() {
            paths.push(n.source_path.clone());
        }
    });
}
