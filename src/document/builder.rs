//! Document tree construction from scanned entries.

use super::title::{extract_h1, page_title, sanitize_title};
use super::DocumentNode;
use crate::error::ApiError;
use crate::tree::path::{
    ancestors, base_name, base_name_without_ext, dir_source_path, is_readme, parent_source_path,
    validate_source_path,
};
use crate::tree::ScanEntry;
use std::collections::{BTreeSet, HashMap};

/// Build the document tree rooted at the source directory.
///
/// `root_name` is the fallback title of the root page. Directories are
/// created for every explicit directory entry and for every ancestor of a
/// scanned file; a directory's `README.md` becomes its content rather than a
/// page of its own. Children keep scan order, directories first.
pub fn build_document_tree(
    entries: &[ScanEntry],
    root_name: &str,
) -> Result<DocumentNode, ApiError> {
    for entry in entries {
        validate_source_path(&entry.source_path)?;
    }

    // README per directory: first one in scan order wins.
    let mut readmes: HashMap<&str, &ScanEntry> = HashMap::new();
    for entry in entries.iter().filter(|e| !e.is_directory && is_readme(&e.source_path)) {
        readmes.entry(dir_source_path(&entry.source_path)).or_insert(entry);
    }

    // Directory set in scan order, with synthesized ancestors.
    let mut dir_order: Vec<&str> = Vec::new();
    let mut known: BTreeSet<&str> = BTreeSet::new();
    for entry in entries {
        let own_dir = if entry.is_directory {
            Some(entry.source_path.as_str())
        } else {
            None
        };
        let mut chain: Vec<&str> = ancestors(&entry.source_path)
            .filter(|p| !p.is_empty())
            .collect();
        chain.reverse();
        chain.extend(own_dir);
        for dir in chain {
            if known.insert(dir) {
                dir_order.push(dir);
            }
        }
    }

    let mut subdirs: HashMap<&str, Vec<&str>> = HashMap::new();
    for dir in dir_order {
        subdirs
            .entry(parent_source_path(dir).unwrap_or(""))
            .or_default()
            .push(dir);
    }

    let mut files: HashMap<&str, Vec<&ScanEntry>> = HashMap::new();
    for entry in entries {
        if entry.is_directory || is_readme(&entry.source_path) {
            continue;
        }
        files
            .entry(parent_source_path(&entry.source_path).unwrap_or(""))
            .or_default()
            .push(entry);
    }

    let layout = Layout {
        readmes,
        subdirs,
        files,
    };
    Ok(layout.directory("", root_name))
}

/// Directory and file membership per parent directory.
struct Layout<'a> {
    readmes: HashMap<&'a str, &'a ScanEntry>,
    subdirs: HashMap<&'a str, Vec<&'a str>>,
    files: HashMap<&'a str, Vec<&'a ScanEntry>>,
}

impl Layout<'_> {
    /// Directory page with its subtree; subdirectories ahead of files.
    fn directory(&self, source_path: &str, name: &str) -> DocumentNode {
        let mut node = directory_node(source_path, name, self.readmes.get(source_path).copied());
        for dir in self.subdirs.get(source_path).into_iter().flatten() {
            node.children.push(self.directory(dir, base_name(dir)));
        }
        for entry in self.files.get(source_path).into_iter().flatten() {
            node.children.push(file_node(entry));
        }
        node
    }
}

fn file_node(entry: &ScanEntry) -> DocumentNode {
    let content = entry.content.clone().unwrap_or_default();
    DocumentNode {
        source_path: entry.source_path.clone(),
        title: page_title(&content, base_name_without_ext(&entry.source_path)),
        content,
        is_directory: false,
        children: Vec::new(),
        readme_source_path: None,
    }
}

fn directory_node(source_path: &str, name: &str, readme: Option<&ScanEntry>) -> DocumentNode {
    let content = readme.and_then(|r| r.content.clone()).unwrap_or_default();
    let title = match extract_h1(&content) {
        Some(h1) => sanitize_title(h1),
        None => name.to_string(),
    };
    DocumentNode {
        source_path: source_path.to_string(),
        title,
        content,
        is_directory: true,
        children: Vec::new(),
        readme_source_path: readme.map(|r| r.source_path.clone()),
    }
}
