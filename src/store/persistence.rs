//! JSON file persistence for cache records.

use super::{CacheRecord, CacheStore, CACHE_VERSION};
use crate::error::ApiError;
use crate::tree::HashTreeNode;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of a target's cache: unsafe characters become `_`.
pub fn cache_file_name(target: &str) -> String {
    let safe: String = target
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.json", safe)
}

/// Cache records stored as one JSON file per target.
#[derive(Debug, Clone)]
pub struct JsonCacheStore {
    dir: PathBuf,
}

impl JsonCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, target: &str) -> PathBuf {
        self.dir.join(cache_file_name(target))
    }
}

impl CacheStore for JsonCacheStore {
    fn load(&self, target: &str) -> Result<Option<CacheRecord>, ApiError> {
        let path = self.path_for(target);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let record: CacheRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cache");
                return Ok(None);
            }
        };

        if record.version != CACHE_VERSION {
            warn!(
                path = %path.display(),
                version = record.version,
                expected = CACHE_VERSION,
                "Ignoring cache of another version"
            );
            return Ok(None);
        }
        Ok(Some(record))
    }

    fn save(&self, target: &str, tree: &HashTreeNode) -> Result<(), ApiError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(target);
        let record = CacheRecord::new(tree.clone());
        let json = serde_json::to_string_pretty(&record)?;

        // Write then rename so a crash never leaves a truncated cache.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), target, "Saved cache");
        Ok(())
    }

    fn clear(&self, target: &str) -> Result<(), ApiError> {
        let path = self.path_for(target);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
