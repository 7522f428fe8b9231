//! Hash tree node type

use crate::types::Digest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of the content hash tree.
///
/// Children are keyed by their last path segment. Serialized with camelCase
/// keys, the layout of the persisted cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashTreeNode {
    pub source_path: String,
    pub hash: Digest,
    #[serde(default)]
    pub children: BTreeMap<String, HashTreeNode>,
}

impl HashTreeNode {
    /// Whether the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Look up a descendant by source path.
    pub fn find(&self, source_path: &str) -> Option<&HashTreeNode> {
        if source_path == self.source_path {
            return Some(self);
        }
        let mut node = self;
        for segment in source_path.split('/') {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(HashTreeNode::node_count).sum::<usize>()
    }

    /// Visit every node of the subtree in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a HashTreeNode)) {
        visit(self);
        for child in self.children.values() {
            child.walk(visit);
        }
    }
}
