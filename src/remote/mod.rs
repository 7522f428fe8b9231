//! Remote page store
//!
//! [`RemoteStore`] is the narrow asynchronous interface the publisher needs
//! from the hierarchical page store. [`GatedRemote`] is the handle the rest
//! of the crate passes around: it routes every call through the
//! [`RemoteGate`] so concurrency and rate-limit retries are applied
//! uniformly.

pub mod index;
pub mod marker;
pub mod memory;
pub mod notion;
pub mod pages;

use crate::concurrency::RemoteGate;
use crate::error::ApiError;
use crate::markdown::Block;
use crate::types::PageId;
use async_trait::async_trait;
use std::sync::Arc;

pub use index::{discover, ManagedPage, SourcePathIndex};
pub use marker::{create_marker, extract_source_path_from_marker};
pub use memory::MemoryStore;
pub use notion::NotionClient;

/// Payload of a child block as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteBlockKind {
    ChildPage { title: String },
    /// Paragraph with its spans' plain text concatenated
    Paragraph { text: String },
    Other { kind: String },
}

/// A child block of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBlock {
    pub id: String,
    pub kind: RemoteBlockKind,
}

impl RemoteBlock {
    pub fn paragraph_text(&self) -> Option<&str> {
        match &self.kind {
            RemoteBlockKind::Paragraph { text } => Some(text),
            _ => None,
        }
    }

    /// Child pages and databases. Deleting one of these archives it
    /// together with everything below it.
    pub fn is_child_container(&self) -> bool {
        match &self.kind {
            RemoteBlockKind::ChildPage { .. } => true,
            RemoteBlockKind::Other { kind } => kind == "child_database",
            RemoteBlockKind::Paragraph { .. } => false,
        }
    }
}

/// One page of a child listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildrenPage {
    pub items: Vec<RemoteBlock>,
    pub next_cursor: Option<String>,
}

/// Asynchronous page store operations.
///
/// Implementations report throttling as [`ApiError::RateLimited`] so the
/// gate can retry it.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn create_page(&self, parent_id: &str, title: &str) -> Result<PageId, ApiError>;

    async fn update_page_title(&self, page_id: &str, title: &str) -> Result<(), ApiError>;

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<ChildrenPage, ApiError>;

    /// Append blocks after the last child of `block_id`; returns the ids of
    /// the new blocks in order.
    async fn append_blocks(
        &self,
        block_id: &str,
        blocks: &[Block],
    ) -> Result<Vec<PageId>, ApiError>;

    async fn delete_block(&self, block_id: &str) -> Result<(), ApiError>;
}

/// Remote store handle with concurrency gate and retry.
#[derive(Clone)]
pub struct GatedRemote {
    store: Arc<dyn RemoteStore>,
    gate: RemoteGate,
}

impl GatedRemote {
    pub fn new(store: Arc<dyn RemoteStore>, gate: RemoteGate) -> Self {
        Self { store, gate }
    }

    pub fn gate(&self) -> &RemoteGate {
        &self.gate
    }

    pub async fn create_page(&self, parent_id: &str, title: &str) -> Result<PageId, ApiError> {
        let store = &self.store;
        self.gate
            .run("create_page", move || store.create_page(parent_id, title))
            .await
    }

    pub async fn update_page_title(&self, page_id: &str, title: &str) -> Result<(), ApiError> {
        let store = &self.store;
        self.gate
            .run("update_page_title", move || {
                store.update_page_title(page_id, title)
            })
            .await
    }

    pub async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<ChildrenPage, ApiError> {
        let store = &self.store;
        self.gate
            .run("list_children", move || {
                store.list_children(block_id, cursor, page_size)
            })
            .await
    }

    pub async fn append_blocks(
        &self,
        block_id: &str,
        blocks: &[Block],
    ) -> Result<Vec<PageId>, ApiError> {
        let store = &self.store;
        self.gate
            .run("append_blocks", move || store.append_blocks(block_id, blocks))
            .await
    }

    pub async fn delete_block(&self, block_id: &str) -> Result<(), ApiError> {
        let store = &self.store;
        self.gate
            .run("delete_block", move || store.delete_block(block_id))
            .await
    }
}
