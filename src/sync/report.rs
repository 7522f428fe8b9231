//! Outcome of a sync run.

use serde::Serialize;
use std::fmt;

/// A failure confined to one document node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeError {
    pub source_path: String,
    pub message: String,
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.source_path.is_empty() {
            "root"
        } else {
            &self.source_path
        };
        write!(f, "{}: {}", path, self.message)
    }
}

/// Counters and errors of one target's run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub target: String,
    pub dry_run: bool,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<NodeError>,
}

impl SyncReport {
    pub fn new(target: impl Into<String>, dry_run: bool) -> Self {
        Self {
            target: target.into(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn record_error(&mut self, source_path: &str, message: impl Into<String>) {
        self.errors.push(NodeError {
            source_path: source_path.to_string(),
            message: message.into(),
        });
    }

    /// Whether no node failed
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
