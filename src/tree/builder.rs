//! Hash tree construction
//!
//! Two passes: the first collects the complete set of source paths, adding
//! every ancestor of every scanned entry; the second folds hashes bottom-up in
//! a single post-order traversal.

use super::hasher::{compute_leaf_hash, compute_node_hash};
use super::node::HashTreeNode;
use super::path::{ancestors, base_name, parent_source_path, validate_source_path};
use super::ScanEntry;
use crate::error::ApiError;
use std::collections::{BTreeMap, BTreeSet};

/// Build the hash tree for a set of scanned entries.
///
/// Directories that only appear as ancestors of deeper entries are synthesized
/// with empty content. Fails on any malformed source path.
pub fn build_hash_tree(entries: &[ScanEntry]) -> Result<HashTreeNode, ApiError> {
    // Pass 1: own content per path, then the ancestor closure.
    let mut contents: BTreeMap<&str, &str> = BTreeMap::new();
    for entry in entries {
        validate_source_path(&entry.source_path)?;
        contents.insert(entry.source_path.as_str(), entry.hashed_content());
    }

    let mut paths: BTreeSet<&str> = contents.keys().copied().collect();
    for entry in entries {
        paths.extend(ancestors(&entry.source_path));
    }
    paths.insert("");

    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for path in paths.iter().copied().filter(|p| !p.is_empty()) {
        let parent = parent_source_path(path).unwrap_or("");
        children.entry(parent).or_default().push(path);
    }

    // Pass 2: post-order fold.
    Ok(fold("", &contents, &children))
}

fn fold(
    path: &str,
    contents: &BTreeMap<&str, &str>,
    children: &BTreeMap<&str, Vec<&str>>,
) -> HashTreeNode {
    let own_hash = compute_leaf_hash(contents.get(path).copied().unwrap_or(""));

    let mut child_nodes = BTreeMap::new();
    if let Some(child_paths) = children.get(path) {
        for child_path in child_paths {
            let node = fold(child_path, contents, children);
            child_nodes.insert(base_name(child_path).to_string(), node);
        }
    }

    let hash = if child_nodes.is_empty() {
        own_hash
    } else {
        let child_hashes: Vec<_> = child_nodes.values().map(|c| c.hash.clone()).collect();
        compute_node_hash(&own_hash, &child_hashes)
    };

    HashTreeNode {
        source_path: path.to_string(),
        hash,
        children: child_nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ScanEntry> {
        vec![
            ScanEntry::file("README.md", "# Root"),
            ScanEntry::directory("docs"),
            ScanEntry::file("docs/guide.md", "# Guide\nHello"),
        ]
    }

    #[test]
    fn test_build_structure() {
        let tree = build_hash_tree(&sample()).unwrap();
        assert_eq!(tree.source_path, "");
        assert_eq!(tree.children.len(), 2);
        let docs = &tree.children["docs"];
        assert_eq!(docs.source_path, "docs");
        let guide = &docs.children["guide.md"];
        assert_eq!(guide.source_path, "docs/guide.md");
        assert_eq!(guide.hash, compute_leaf_hash("# Guide\nHello"));
        assert_eq!(
            docs.hash,
            compute_node_hash(&compute_leaf_hash(""), &[guide.hash.clone()])
        );
    }

    #[test]
    fn test_missing_ancestors_are_synthesized() {
        let entries = vec![ScanEntry::file("a/b/c/deep.md", "deep")];
        let tree = build_hash_tree(&entries).unwrap();
        let b = tree.find("a/b").unwrap();
        assert_eq!(b.source_path, "a/b");
        assert!(tree.find("a/b/c/deep.md").is_some());
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_explicit_and_synthesized_directory_hash_equal() {
        let explicit = build_hash_tree(&sample()).unwrap();
        let implicit = build_hash_tree(&[
            ScanEntry::file("README.md", "# Root"),
            ScanEntry::file("docs/guide.md", "# Guide\nHello"),
        ])
        .unwrap();
        assert_eq!(explicit, implicit);
    }

    #[test]
    fn test_entry_order_does_not_matter() {
        let mut reversed = sample();
        reversed.reverse();
        assert_eq!(
            build_hash_tree(&sample()).unwrap().hash,
            build_hash_tree(&reversed).unwrap().hash
        );
    }

    #[test]
    fn test_empty_directory_is_a_leaf() {
        let tree = build_hash_tree(&[ScanEntry::directory("empty")]).unwrap();
        assert_eq!(tree.children["empty"].hash, compute_leaf_hash(""));
    }

    #[test]
    fn test_invalid_path_is_fatal() {
        let result = build_hash_tree(&[ScanEntry::file("../escape.md", "x")]);
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }
}
