//! Source Document Tree
//!
//! The hierarchy of pages to publish, built from scanned entries. Directory
//! pages take their title and content from their README.

pub mod builder;
pub mod title;

pub use builder::build_document_tree;

/// One page of the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    pub source_path: String,
    pub title: String,
    pub content: String,
    pub is_directory: bool,
    pub children: Vec<DocumentNode>,
    /// Source path of the README backing a directory page
    pub readme_source_path: Option<String>,
}

impl DocumentNode {
    /// Number of pages in this subtree, including this one
    pub fn page_count(&self) -> usize {
        1 + self.children.iter().map(DocumentNode::page_count).sum::<usize>()
    }

    /// Label used in logs and error reports; the root has an empty path.
    pub fn display_path(&self) -> &str {
        if self.source_path.is_empty() {
            "root"
        } else {
            &self.source_path
        }
    }
}
