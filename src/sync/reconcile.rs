//! Reconciler
//!
//! Walks the document tree depth first and decides, per node, whether its
//! page is created, updated or left alone. A node's page id is resolved
//! before any of its children is visited, and a failure is recorded against
//! the node without stopping the walk.

use super::report::SyncReport;
use crate::document::DocumentNode;
use crate::error::ApiError;
use crate::markdown::markdown_to_blocks;
use crate::remote::pages::{append_blocks, create_managed_page, replace_page_content};
use crate::remote::{GatedRemote, SourcePathIndex};
use crate::tree::path::{dir_source_path, is_readme};
use crate::tree::DiffResult;
use crate::types::PageId;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Nodes whose pages must be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSet {
    /// Every existing page is rewritten
    Full,
    /// Source paths added or modified since the cached run
    Paths(HashSet<String>),
}

impl ChangeSet {
    /// Added and modified paths, plus directories whose README was removed.
    pub fn from_diff(diff: &DiffResult) -> Self {
        let mut paths = diff.touched_paths();
        paths.extend(
            diff.deleted
                .iter()
                .filter(|path| is_readme(path))
                .map(|path| dir_source_path(path).to_string()),
        );
        ChangeSet::Paths(paths)
    }

    /// Whether the node's page content is stale. A directory page is stale
    /// when its README changed.
    pub fn contains(&self, node: &DocumentNode) -> bool {
        match self {
            ChangeSet::Full => true,
            ChangeSet::Paths(paths) => {
                paths.contains(&node.source_path)
                    || node
                        .readme_source_path
                        .as_ref()
                        .is_some_and(|readme| paths.contains(readme))
            }
        }
    }
}

/// Maps document nodes onto remote pages.
pub struct Reconciler<'r> {
    /// `None` in dry-run mode
    remote: Option<&'r GatedRemote>,
}

impl<'r> Reconciler<'r> {
    pub fn live(remote: &'r GatedRemote) -> Self {
        Self {
            remote: Some(remote),
        }
    }

    /// Reconciler that reports every node as a create and calls nothing.
    pub fn dry_run() -> Self {
        Self { remote: None }
    }

    /// Reconcile `node` and its subtree below `parent_id`; returns the node's
    /// page id, empty when its page could not be created.
    pub fn reconcile<'a>(
        &'a self,
        node: &'a DocumentNode,
        parent_id: PageId,
        index: &'a mut SourcePathIndex,
        changes: &'a ChangeSet,
        report: &'a mut SyncReport,
    ) -> BoxFuture<'a, PageId> {
        async move {
            let page_id = match self.apply(node, &parent_id, index, changes, report).await {
                Ok(page_id) => page_id,
                Err(err) => {
                    error!(
                        source_path = node.display_path(),
                        error = %err,
                        "Failed to publish page"
                    );
                    report.record_error(&node.source_path, err.to_string());
                    index.get(&node.source_path).cloned().unwrap_or_default()
                }
            };

            for child in &node.children {
                self.reconcile(child, page_id.clone(), index, changes, report)
                    .await;
            }
            page_id
        }
        .boxed()
    }

    async fn apply(
        &self,
        node: &DocumentNode,
        parent_id: &str,
        index: &mut SourcePathIndex,
        changes: &ChangeSet,
        report: &mut SyncReport,
    ) -> Result<PageId, ApiError> {
        let Some(remote) = self.remote else {
            info!(
                source_path = node.display_path(),
                title = %node.title,
                "[dry-run] Would create page"
            );
            report.created += 1;
            return Ok(format!("dry-run-{}", node.display_path()));
        };

        match index.get(&node.source_path).cloned() {
            None => {
                if parent_id.is_empty() {
                    return Err(ApiError::ValidationError(
                        "Parent page is unavailable".to_string(),
                    ));
                }
                let page_id =
                    create_managed_page(remote, parent_id, &node.title, &node.source_path).await?;
                // Children attach to this page even if the upload below fails.
                index.insert(node.source_path.as_str(), page_id.as_str());
                report.created += 1;
                info!(
                    source_path = node.display_path(),
                    title = %node.title,
                    page_id = %page_id,
                    "Created page"
                );

                if !node.content.trim().is_empty() {
                    append_blocks(remote, &page_id, &markdown_to_blocks(&node.content)).await?;
                }
                Ok(page_id)
            }
            Some(page_id) if changes.contains(node) => {
                remote.update_page_title(&page_id, &node.title).await?;
                let blocks = markdown_to_blocks(&node.content);
                replace_page_content(remote, &page_id, &node.source_path, &blocks).await?;
                report.updated += 1;
                info!(
                    source_path = node.display_path(),
                    page_id = %page_id,
                    blocks = blocks.len(),
                    "Updated page"
                );
                Ok(page_id)
            }
            Some(page_id) => {
                debug!(source_path = node.display_path(), "Unchanged, skipping");
                report.skipped += 1;
                Ok(page_id)
            }
        }
    }
}
