//! Source directory walker
//!
//! Produces the ordered scan-entry list consumed by the tree builders:
//! every directory, and every markdown file together with its content.
//! Hidden entries (leading `.`) are not published and are skipped.

use super::path::{is_markdown, source_path_of};
use super::ScanEntry;
use crate::error::ApiError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links while walking
    pub follow_links: bool,
    /// Maximum depth below the source root; `None` walks everything
    pub max_depth: Option<usize>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_depth: None,
        }
    }
}

/// Scans a source root into [`ScanEntry`] values.
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker for `root`. The root must exist and be a directory.
    pub fn new(root: &Path, config: WalkerConfig) -> Result<Self, ApiError> {
        let root = dunce::canonicalize(root).map_err(|_| {
            ApiError::NotFound(format!("Source directory not found: {}", root.display()))
        })?;
        if !root.is_dir() {
            return Err(ApiError::NotFound(format!(
                "Source path is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root, config })
    }

    /// Canonical source root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Display name of the root directory, used as the fallback root title.
    pub fn root_name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Walk the source root. Entries come out in file-name order, parents
    /// before children.
    pub fn scan(&self) -> Result<Vec<ScanEntry>, ApiError> {
        let mut walk = WalkDir::new(&self.root)
            .follow_links(self.config.follow_links)
            .sort_by_file_name()
            .min_depth(1);
        if let Some(depth) = self.config.max_depth {
            walk = walk.max_depth(depth);
        }

        let mut entries = Vec::new();
        for entry in walk.into_iter().filter_entry(|e| !is_hidden(e)) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let source_path = source_path_of(entry.path(), &self.root)?;
            if entry.file_type().is_dir() {
                entries.push(ScanEntry::directory(source_path));
            } else if entry.file_type().is_file() && is_markdown(&source_path) {
                let content = read_lossy(entry.path(), &source_path)?;
                entries.push(ScanEntry::file(source_path, content));
            }
        }

        debug!(
            root = %self.root.display(),
            entries = entries.len(),
            "Scanned source directory"
        );
        Ok(entries)
    }
}

/// Read a file as UTF-8, replacing invalid sequences with U+FFFD.
fn read_lossy(path: &Path, source_path: &str) -> Result<String, ApiError> {
    let bytes = std::fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(err) => {
            warn!(source_path, "File is not valid UTF-8, invalid bytes replaced");
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}
