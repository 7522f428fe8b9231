//! Remote tree indexer
//!
//! Discovers the pages this tool manages below a root page. A child page is
//! managed when its first block is a paragraph holding the identity marker;
//! only managed pages are descended into, so unrelated content next to the
//! published tree is never visited.

use super::marker::extract_source_path_from_marker;
use super::pages::first_block;
use super::{GatedRemote, RemoteBlockKind};
use crate::error::ApiError;
use crate::types::{PageId, LIST_PAGE_SIZE};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use tracing::debug;

/// A page carrying a valid identity marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPage {
    pub page_id: PageId,
    pub source_path: String,
    pub title: String,
}

/// List every managed page below `root_id`, parents before children.
pub async fn discover(remote: &GatedRemote, root_id: &str) -> Result<Vec<ManagedPage>, ApiError> {
    let mut pages = Vec::new();
    discover_into(remote, root_id.to_string(), &mut pages).await?;
    debug!(root_id, managed = pages.len(), "Discovered managed pages");
    Ok(pages)
}

fn discover_into<'a>(
    remote: &'a GatedRemote,
    parent_id: PageId,
    pages: &'a mut Vec<ManagedPage>,
) -> BoxFuture<'a, Result<(), ApiError>> {
    async move {
        let mut cursor: Option<String> = None;
        loop {
            let listing = remote
                .list_children(&parent_id, cursor.as_deref(), LIST_PAGE_SIZE)
                .await?;

            for block in listing.items {
                let RemoteBlockKind::ChildPage { title } = block.kind else {
                    continue;
                };
                let Some(source_path) = managed_source_path(remote, &block.id).await? else {
                    debug!(page_id = %block.id, title = %title, "Skipping unmanaged page");
                    continue;
                };
                pages.push(ManagedPage {
                    page_id: block.id.clone(),
                    source_path,
                    title,
                });
                discover_into(remote, block.id, pages).await?;
            }

            match listing.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(()),
            }
        }
    }
    .boxed()
}

/// Source path from the page's marker, if its first block is one.
async fn managed_source_path(
    remote: &GatedRemote,
    page_id: &str,
) -> Result<Option<String>, ApiError> {
    let first = first_block(remote, page_id).await?;
    Ok(first
        .as_ref()
        .and_then(|block| block.paragraph_text())
        .and_then(extract_source_path_from_marker)
        .map(str::to_string))
}

/// Source path to page id lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePathIndex {
    entries: HashMap<String, PageId>,
}

impl SourcePathIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from discovered pages; later duplicates win.
    pub fn from_pages(pages: &[ManagedPage]) -> Self {
        let entries = pages
            .iter()
            .map(|page| (page.source_path.clone(), page.page_id.clone()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, source_path: &str) -> Option<&PageId> {
        self.entries.get(source_path)
    }

    pub fn insert(&mut self, source_path: impl Into<String>, page_id: impl Into<PageId>) {
        self.entries.insert(source_path.into(), page_id.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::RemoteGate;
    use crate::markdown::Block;
    use crate::remote::pages::create_managed_page;
    use crate::remote::{MemoryStore, RemoteStore};
    use std::sync::Arc;

    fn page(id: &str, path: &str) -> ManagedPage {
        ManagedPage {
            page_id: id.to_string(),
            source_path: path.to_string(),
            title: path.to_string(),
        }
    }

    #[test]
    fn test_later_duplicates_win() {
        let index = SourcePathIndex::from_pages(&[page("p1", "a.md"), page("p2", "b.md"), page("p3", "a.md")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a.md").map(String::as_str), Some("p3"));
    }

    #[tokio::test]
    async fn test_discover_managed_tree() {
        let store = Arc::new(MemoryStore::new("root"));
        let remote = GatedRemote::new(store.clone(), RemoteGate::default());

        let root = create_managed_page(&remote, "root", "Docs", "").await.unwrap();
        let guide = create_managed_page(&remote, &root, "Guide", "guide.md").await.unwrap();

        let pages = discover(&remote, "root").await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].source_path, "");
        assert_eq!(pages[0].page_id, root);
        assert_eq!(pages[1].source_path, "guide.md");
        assert_eq!(pages[1].page_id, guide);
        assert_eq!(pages[1].title, "Guide");
    }

    #[tokio::test]
    async fn test_unmanaged_pages_are_not_descended() {
        let store = Arc::new(MemoryStore::new("root"));
        let remote = GatedRemote::new(store.clone(), RemoteGate::default());

        let notes = store.create_page("root", "Notes").await.unwrap();
        store
            .append_blocks(&notes, &[Block::plain_paragraph("hand written")])
            .await
            .unwrap();
        // A marked page below an unmanaged one stays invisible.
        create_managed_page(&remote, &notes, "Hidden", "hidden.md").await.unwrap();
        let empty = store.create_page("root", "Empty").await.unwrap();
        store.append_blocks(&empty, &[Block::Divider]).await.unwrap();
        create_managed_page(&remote, "root", "Real", "real.md").await.unwrap();

        let pages = discover(&remote, "root").await.unwrap();
        let paths: Vec<&str> = pages.iter().map(|p| p.source_path.as_str()).collect();
        assert_eq!(paths, vec!["real.md"]);
    }

    #[tokio::test]
    async fn test_discovery_follows_pagination() {
        let store = Arc::new(MemoryStore::new("root"));
        let remote = GatedRemote::new(store.clone(), RemoteGate::default());
        store
            .append_blocks("root", &vec![Block::Divider; 150])
            .await
            .unwrap();
        create_managed_page(&remote, "root", "Late", "late.md").await.unwrap();

        let pages = discover(&remote, "root").await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].source_path, "late.md");
    }
}
