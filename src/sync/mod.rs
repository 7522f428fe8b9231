//! Sync Engine
//!
//! Runs one target end to end: scan the source directory, build the document
//! and hash trees, diff against the cached tree, discover managed pages,
//! reconcile and persist the new tree.

pub mod reconcile;
pub mod report;

pub use reconcile::{ChangeSet, Reconciler};
pub use report::{NodeError, SyncReport};

use crate::document::{build_document_tree, DocumentNode};
use crate::error::ApiError;
use crate::remote::{discover, GatedRemote, SourcePathIndex};
use crate::store::CacheStore;
use crate::tree::walker::{Walker, WalkerConfig};
use crate::tree::{build_hash_tree, diff, DiffResult, HashTreeNode};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// Per-run switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Report what would be created without calling the remote store
    pub dry_run: bool,
    /// Ignore the cache and rewrite every existing page
    pub force: bool,
}

/// A target with its source directory resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub name: String,
    pub src_root: PathBuf,
    pub parent_page_id: String,
}

/// Scanned state of a target and its change set against the cache.
#[derive(Debug, Clone)]
pub struct TargetSnapshot {
    pub entry_count: usize,
    pub document: DocumentNode,
    pub hash_tree: HashTreeNode,
    /// Whether a usable cache record was found
    pub has_cache: bool,
    pub diff: DiffResult,
}

impl TargetSnapshot {
    /// Change set to reconcile with; everything when there was no cache.
    pub fn change_set(&self) -> ChangeSet {
        if self.has_cache {
            ChangeSet::from_diff(&self.diff)
        } else {
            ChangeSet::Full
        }
    }
}

/// Drives targets through the sync pipeline.
pub struct SyncEngine {
    /// Absent for engines that only plan or dry-run
    remote: Option<GatedRemote>,
    cache: Arc<dyn CacheStore>,
    walker_config: WalkerConfig,
}

impl SyncEngine {
    pub fn new(remote: Option<GatedRemote>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            remote,
            cache,
            walker_config: WalkerConfig::default(),
        }
    }

    pub fn with_walker_config(mut self, walker_config: WalkerConfig) -> Self {
        self.walker_config = walker_config;
        self
    }

    /// Scan a target and diff it against its cached tree.
    ///
    /// With `ignore_cache` the cache is not read and every path is added.
    pub fn snapshot(
        &self,
        target: &ResolvedTarget,
        ignore_cache: bool,
    ) -> Result<TargetSnapshot, ApiError> {
        let walker = Walker::new(&target.src_root, self.walker_config.clone())?;
        let entries = walker.scan()?;
        let document = build_document_tree(&entries, &walker.root_name())?;
        let hash_tree = build_hash_tree(&entries)?;

        let previous = if ignore_cache {
            None
        } else {
            self.cache.load(&target.name)?.map(|record| record.tree)
        };
        let diff = diff(previous.as_ref(), &hash_tree);

        Ok(TargetSnapshot {
            entry_count: entries.len(),
            document,
            hash_tree,
            has_cache: previous.is_some(),
            diff,
        })
    }

    /// Publish one target.
    ///
    /// Top-level failures (scan, tree building, discovery) abort the run
    /// and leave the cache untouched. Per-page failures are collected in the
    /// report and the cache is still written.
    #[instrument(skip_all, fields(target = %target.name, dry_run = options.dry_run))]
    pub async fn sync_target(
        &self,
        target: &ResolvedTarget,
        options: SyncOptions,
    ) -> Result<SyncReport, ApiError> {
        let snapshot = self.snapshot(target, options.force)?;
        let changes = snapshot.change_set();
        info!(
            src = %target.src_root.display(),
            entries = snapshot.entry_count,
            pages = snapshot.document.page_count(),
            added = snapshot.diff.added.len(),
            modified = snapshot.diff.modified.len(),
            deleted = snapshot.diff.deleted.len(),
            full = matches!(changes, ChangeSet::Full),
            "Scanned target"
        );

        let mut report = SyncReport::new(&target.name, options.dry_run);
        let parent_id = target.parent_page_id.clone();

        if options.dry_run {
            let mut index = SourcePathIndex::new();
            Reconciler::dry_run()
                .reconcile(&snapshot.document, parent_id, &mut index, &changes, &mut report)
                .await;
            return Ok(report);
        }

        let remote = self.remote.as_ref().ok_or_else(|| {
            ApiError::ConfigError("A remote store is required unless dry-run is set".to_string())
        })?;
        let managed = discover(remote, &target.parent_page_id).await?;
        info!(managed = managed.len(), "Found managed pages");
        let mut index = SourcePathIndex::from_pages(&managed);

        Reconciler::live(remote)
            .reconcile(&snapshot.document, parent_id, &mut index, &changes, &mut report)
            .await;

        self.cache.save(&target.name, &snapshot.hash_tree)?;
        info!(
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            errors = report.errors.len(),
            "Target synced"
        );
        Ok(report)
    }
}
