//! Page-level operations built on the gated remote handle.

use super::marker::{create_marker, is_marker_for};
use super::{GatedRemote, RemoteBlock};
use crate::error::ApiError;
use crate::markdown::block::TableRow;
use crate::markdown::Block;
use crate::types::{PageId, APPEND_BATCH_SIZE, LIST_PAGE_SIZE};
use tracing::debug;

/// Marker paragraph for a source path.
pub fn marker_block(source_path: &str) -> Block {
    Block::plain_paragraph(&create_marker(source_path))
}

/// Create a page under `parent_id` and stamp it with the marker for
/// `source_path`.
pub async fn create_managed_page(
    remote: &GatedRemote,
    parent_id: &str,
    title: &str,
    source_path: &str,
) -> Result<PageId, ApiError> {
    let page_id = remote.create_page(parent_id, title).await?;
    remote
        .append_blocks(&page_id, &[marker_block(source_path)])
        .await?;
    Ok(page_id)
}

/// First child block of a page, if any.
pub async fn first_block(
    remote: &GatedRemote,
    page_id: &str,
) -> Result<Option<RemoteBlock>, ApiError> {
    let page = remote.list_children(page_id, None, 1).await?;
    Ok(page.items.into_iter().next())
}

/// Every child block of a page, following pagination.
pub async fn list_all_children(
    remote: &GatedRemote,
    page_id: &str,
) -> Result<Vec<RemoteBlock>, ApiError> {
    let mut blocks = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = remote
            .list_children(page_id, cursor.as_deref(), LIST_PAGE_SIZE)
            .await?;
        blocks.extend(page.items);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(blocks)
}

/// Remove the content blocks after the marker, keeping the page's identity.
///
/// Child pages and databases are kept: they are the pages of child nodes,
/// reconciled on their own. When the first block is not the marker for
/// `source_path`, every content block is removed and the marker is appended
/// again.
pub async fn clear_page_content(
    remote: &GatedRemote,
    page_id: &str,
    source_path: &str,
) -> Result<(), ApiError> {
    let blocks = list_all_children(remote, page_id).await?;
    let has_marker = blocks
        .first()
        .and_then(RemoteBlock::paragraph_text)
        .is_some_and(|text| is_marker_for(text, source_path));

    let after_marker = if has_marker { &blocks[1..] } else { &blocks[..] };
    let stale: Vec<&RemoteBlock> = after_marker
        .iter()
        .filter(|block| !block.is_child_container())
        .collect();
    debug!(
        page_id,
        source_path,
        removed = stale.len(),
        kept = after_marker.len() - stale.len(),
        has_marker,
        "Clearing page content"
    );
    for block in stale {
        remote.delete_block(&block.id).await?;
    }

    if !has_marker {
        remote
            .append_blocks(page_id, &[marker_block(source_path)])
            .await?;
    }
    Ok(())
}

/// Append blocks in batches the store accepts.
///
/// A table may carry at most [`APPEND_BATCH_SIZE`] rows when it is created;
/// the remaining rows are appended to the new table block afterwards.
pub async fn append_blocks(
    remote: &GatedRemote,
    page_id: &str,
    blocks: &[Block],
) -> Result<(), ApiError> {
    for batch in blocks.chunks(APPEND_BATCH_SIZE) {
        let (head, overflow) = split_long_tables(batch);
        let ids = remote.append_blocks(page_id, &head).await?;
        for (position, rows) in overflow {
            let table_id = ids.get(position).ok_or_else(|| {
                ApiError::ValidationError(format!(
                    "Store returned {} ids for {} blocks",
                    ids.len(),
                    head.len()
                ))
            })?;
            debug!(page_id, table_id = %table_id, rows = rows.len(), "Appending table rows");
            for chunk in rows.chunks(APPEND_BATCH_SIZE) {
                let row_blocks: Vec<Block> = chunk
                    .iter()
                    .map(|cells| Block::TableRow {
                        cells: cells.clone(),
                    })
                    .collect();
                remote.append_blocks(table_id, &row_blocks).await?;
            }
        }
    }
    Ok(())
}

/// Cap every table in `batch` at [`APPEND_BATCH_SIZE`] rows. Returns the
/// capped batch and, per capped table, its position and the rows cut off.
fn split_long_tables(batch: &[Block]) -> (Vec<Block>, Vec<(usize, Vec<TableRow>)>) {
    let mut overflow = Vec::new();
    let head = batch
        .iter()
        .enumerate()
        .map(|(position, block)| match block {
            Block::Table {
                width,
                has_header,
                rows,
            } if rows.len() > APPEND_BATCH_SIZE => {
                overflow.push((position, rows[APPEND_BATCH_SIZE..].to_vec()));
                Block::Table {
                    width: *width,
                    has_header: *has_header,
                    rows: rows[..APPEND_BATCH_SIZE].to_vec(),
                }
            }
            other => other.clone(),
        })
        .collect();
    (head, overflow)
}

/// Replace everything after the marker with `blocks`.
pub async fn replace_page_content(
    remote: &GatedRemote,
    page_id: &str,
    source_path: &str,
    blocks: &[Block],
) -> Result<(), ApiError> {
    clear_page_content(remote, page_id, source_path).await?;
    append_blocks(remote, page_id, blocks).await
}
