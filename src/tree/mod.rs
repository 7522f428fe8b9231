//! Source Hash Tree
//!
//! Represents the scanned source directory as a Merkle tree, where each node
//! (file or directory) has a deterministic hash based on its content and the
//! hashes of its children.

pub mod builder;
pub mod diff;
pub mod hasher;
pub mod node;
pub mod path;
pub mod walker;

pub use builder::build_hash_tree;
pub use diff::{diff, DiffResult};
pub use node::HashTreeNode;

use serde::{Deserialize, Serialize};

/// One scanned file or directory.
///
/// `content` is present only for markdown files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub source_path: String,
    pub is_directory: bool,
    pub content: Option<String>,
}

impl ScanEntry {
    pub fn file(source_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            is_directory: false,
            content: Some(content.into()),
        }
    }

    pub fn directory(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            is_directory: true,
            content: None,
        }
    }

    /// Raw text hashed for this entry; directories hash as empty content.
    pub fn hashed_content(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}
