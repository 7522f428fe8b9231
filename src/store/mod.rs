//! Cache Store
//!
//! Persists the hash tree of the last run per target so the next run can
//! diff against it.

pub mod persistence;

use crate::error::ApiError;
use crate::tree::HashTreeNode;
use serde::{Deserialize, Serialize};

pub use persistence::{cache_file_name, JsonCacheStore};

/// Format version of the cache record; any other version is ignored
pub const CACHE_VERSION: u32 = 1;

/// CacheRecord: hash tree of the last run of a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub version: u32,
    pub tree: HashTreeNode,
    /// Write time in epoch milliseconds
    pub timestamp: i64,
}

impl CacheRecord {
    /// Record for `tree` stamped with the current time.
    pub fn new(tree: HashTreeNode) -> Self {
        Self {
            version: CACHE_VERSION,
            tree,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Cache Store interface
pub trait CacheStore: Send + Sync {
    /// Last saved record; `None` when missing, unreadable or of another version.
    fn load(&self, target: &str) -> Result<Option<CacheRecord>, ApiError>;
    fn save(&self, target: &str, tree: &HashTreeNode) -> Result<(), ApiError>;
    fn clear(&self, target: &str) -> Result<(), ApiError>;
}
