//! In-memory page store
//!
//! Mirrors the block model of the hosted store closely enough to drive the
//! whole sync pipeline in tests: pages are child blocks of their parent,
//! listings are cursor-paginated, and every call is counted. Rate limits and
//! failures can be injected.

use super::notion::block_type;
use super::{ChildrenPage, RemoteBlock, RemoteBlockKind, RemoteStore};
use crate::error::ApiError;
use crate::markdown::Block;
use crate::types::{PageId, APPEND_BATCH_SIZE};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub create_calls: usize,
    pub update_title_calls: usize,
    pub list_calls: usize,
    pub append_calls: usize,
    pub delete_calls: usize,
}

impl StoreStats {
    /// Calls that change remote state.
    pub fn mutation_calls(&self) -> usize {
        self.create_calls + self.update_title_calls + self.append_calls + self.delete_calls
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    titles: HashMap<PageId, String>,
    children: HashMap<String, Vec<RemoteBlock>>,
    stats: StoreStats,
    rate_limits_pending: usize,
    failing_titles: HashSet<String>,
}

impl State {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Consume one injected rate limit, if any is pending.
    fn take_rate_limit(&mut self) -> Result<(), ApiError> {
        if self.rate_limits_pending > 0 {
            self.rate_limits_pending -= 1;
            return Err(ApiError::RateLimited("injected rate limit".to_string()));
        }
        Ok(())
    }

    fn require_container(&self, id: &str) -> Result<(), ApiError> {
        if self.children.contains_key(id) {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("Block {:?}", id)))
        }
    }
}

/// In-memory [`RemoteStore`].
#[derive(Debug)]
pub struct MemoryStore {
    root_id: PageId,
    state: Mutex<State>,
}

impl MemoryStore {
    /// Store holding a single empty root page.
    pub fn new(root_id: impl Into<PageId>) -> Self {
        let root_id = root_id.into();
        let mut state = State::default();
        state.titles.insert(root_id.clone(), "root".to_string());
        state.children.insert(root_id.clone(), Vec::new());
        Self {
            root_id,
            state: Mutex::new(state),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn stats(&self) -> StoreStats {
        self.state.lock().stats
    }

    pub fn reset_stats(&self) {
        self.state.lock().stats = StoreStats::default();
    }

    /// Make the next `count` calls fail with a rate limit.
    pub fn inject_rate_limits(&self, count: usize) {
        self.state.lock().rate_limits_pending = count;
    }

    /// Make every page creation with this title fail.
    pub fn fail_creates_titled(&self, title: impl Into<String>) {
        self.state.lock().failing_titles.insert(title.into());
    }

    pub fn title_of(&self, page_id: &str) -> Option<String> {
        self.state.lock().titles.get(page_id).cloned()
    }

    pub fn block_count(&self, page_id: &str) -> usize {
        self.state
            .lock()
            .children
            .get(page_id)
            .map_or(0, Vec::len)
    }

    /// Plain text of every paragraph of a page, in order.
    pub fn paragraph_texts(&self, page_id: &str) -> Vec<String> {
        self.state
            .lock()
            .children
            .get(page_id)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|b| b.paragraph_text().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids and titles of the child pages of a page, in order.
    pub fn child_pages(&self, page_id: &str) -> Vec<(PageId, String)> {
        self.state
            .lock()
            .children
            .get(page_id)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|b| match &b.kind {
                        RemoteBlockKind::ChildPage { title } => Some((b.id.clone(), title.clone())),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of pages, root excluded.
    pub fn page_count(&self) -> usize {
        self.state.lock().titles.len() - 1
    }
}

fn stored_block(id: String, block: &Block) -> RemoteBlock {
    let kind = match block {
        Block::Paragraph { .. } => RemoteBlockKind::Paragraph {
            text: block.plain_text(),
        },
        other => RemoteBlockKind::Other {
            kind: block_type(other).to_string(),
        },
    };
    RemoteBlock { id, kind }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn create_page(&self, parent_id: &str, title: &str) -> Result<PageId, ApiError> {
        let mut state = self.state.lock();
        state.stats.create_calls += 1;
        state.take_rate_limit()?;
        state.require_container(parent_id)?;
        if state.failing_titles.contains(title) {
            return Err(ApiError::RemoteApiError {
                status: 500,
                message: format!("cannot create {:?}", title),
            });
        }

        let id = state.allocate_id("page");
        state.titles.insert(id.clone(), title.to_string());
        state.children.insert(id.clone(), Vec::new());
        if let Some(siblings) = state.children.get_mut(parent_id) {
            siblings.push(RemoteBlock {
                id: id.clone(),
                kind: RemoteBlockKind::ChildPage {
                    title: title.to_string(),
                },
            });
        }
        Ok(id)
    }

    async fn update_page_title(&self, page_id: &str, title: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.stats.update_title_calls += 1;
        state.take_rate_limit()?;
        match state.titles.get_mut(page_id) {
            Some(existing) => *existing = title.to_string(),
            None => return Err(ApiError::NotFound(format!("Page {:?}", page_id))),
        }
        for blocks in state.children.values_mut() {
            for block in blocks.iter_mut().filter(|b| b.id == page_id) {
                block.kind = RemoteBlockKind::ChildPage {
                    title: title.to_string(),
                };
            }
        }
        Ok(())
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<ChildrenPage, ApiError> {
        let mut state = self.state.lock();
        state.stats.list_calls += 1;
        state.take_rate_limit()?;
        let blocks = state
            .children
            .get(block_id)
            .ok_or_else(|| ApiError::NotFound(format!("Block {:?}", block_id)))?;

        let start = match cursor {
            Some(cursor) => cursor.parse::<usize>().map_err(|_| {
                ApiError::ValidationError(format!("Invalid cursor {:?}", cursor))
            })?,
            None => 0,
        };
        let end = (start + page_size.max(1)).min(blocks.len());
        let items = blocks.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_cursor = (end < blocks.len()).then(|| end.to_string());
        Ok(ChildrenPage { items, next_cursor })
    }

    async fn append_blocks(
        &self,
        block_id: &str,
        blocks: &[Block],
    ) -> Result<Vec<PageId>, ApiError> {
        let mut state = self.state.lock();
        state.stats.append_calls += 1;
        state.take_rate_limit()?;
        state.require_container(block_id)?;
        if let Some(rows) = blocks.iter().find_map(|block| match block {
            Block::Table { rows, .. } if rows.len() > APPEND_BATCH_SIZE => Some(rows.len()),
            _ => None,
        }) {
            return Err(ApiError::RemoteApiError {
                status: 400,
                message: format!("table has {} rows, at most {} allowed", rows, APPEND_BATCH_SIZE),
            });
        }

        let mut ids = Vec::with_capacity(blocks.len());
        for block in blocks {
            let id = state.allocate_id("block");
            // Table rows are children of the table block.
            if let Block::Table { rows, .. } = block {
                let row_blocks: Vec<RemoteBlock> = rows
                    .iter()
                    .map(|_| RemoteBlock {
                        id: state.allocate_id("row"),
                        kind: RemoteBlockKind::Other {
                            kind: "table_row".to_string(),
                        },
                    })
                    .collect();
                state.children.insert(id.clone(), row_blocks);
            }
            let stored = stored_block(id.clone(), block);
            if let Some(children) = state.children.get_mut(block_id) {
                children.push(stored);
            }
            ids.push(id);
        }
        Ok(ids)
    }

    async fn delete_block(&self, block_id: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.stats.delete_calls += 1;
        state.take_rate_limit()?;
        let mut found = false;
        for blocks in state.children.values_mut() {
            let before = blocks.len();
            blocks.retain(|b| b.id != block_id);
            found |= blocks.len() != before;
        }
        if !found {
            return Err(ApiError::NotFound(format!("Block {:?}", block_id)));
        }
        if state.children.remove(block_id).is_some() {
            state.titles.remove(block_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_are_child_blocks() {
        let store = MemoryStore::new("root");
        let id = store.create_page("root", "Docs").await.unwrap();

        let listing = store.list_children("root", None, 100).await.unwrap();
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].id, id);
        assert_eq!(
            listing.items[0].kind,
            RemoteBlockKind::ChildPage {
                title: "Docs".to_string()
            }
        );
        assert_eq!(store.page_count(), 1);
    }

    #[tokio::test]
    async fn test_create_under_missing_parent_fails() {
        let store = MemoryStore::new("root");
        let err = store.create_page("", "Orphan").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_listing_is_paginated() {
        let store = MemoryStore::new("root");
        let blocks: Vec<Block> = (0..5).map(|i| Block::plain_paragraph(&i.to_string())).collect();
        store.append_blocks("root", &blocks).await.unwrap();

        let first = store.list_children("root", None, 2).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.next_cursor.as_deref(), Some("2"));

        let last = store.list_children("root", Some("4"), 2).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.next_cursor, None);
    }

    #[tokio::test]
    async fn test_injected_rate_limits() {
        let store = MemoryStore::new("root");
        store.inject_rate_limits(1);
        assert!(store
            .create_page("root", "A")
            .await
            .unwrap_err()
            .is_rate_limited());
        assert!(store.create_page("root", "A").await.is_ok());
        assert_eq!(store.stats().create_calls, 2);
    }

    #[tokio::test]
    async fn test_update_title_renames_child_block() {
        let store = MemoryStore::new("root");
        let id = store.create_page("root", "Old").await.unwrap();
        store.update_page_title(&id, "New").await.unwrap();
        assert_eq!(store.title_of(&id).as_deref(), Some("New"));
        assert_eq!(store.child_pages("root"), vec![(id, "New".to_string())]);
    }

    #[tokio::test]
    async fn test_delete_block() {
        let store = MemoryStore::new("root");
        store
            .append_blocks("root", &[Block::plain_paragraph("x"), Block::Divider])
            .await
            .unwrap();
        let listing = store.list_children("root", None, 10).await.unwrap();
        store.delete_block(&listing.items[0].id).await.unwrap();
        assert_eq!(store.block_count("root"), 1);
        assert!(store.delete_block("missing").await.is_err());
        assert_eq!(store.stats().mutation_calls(), 3);
    }
}
