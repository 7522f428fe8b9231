//! Core types shared across the publishing pipeline.

/// Digest: truncated hex content hash of a tree node
pub type Digest = String;

/// PageId: identifier of a page (or block) in the remote store
pub type PageId = String;

/// Maximum length of a single rich-text span, in UTF-16 code units
pub const MAX_SPAN_LEN: usize = 2000;

/// Maximum number of blocks sent in one append call
pub const APPEND_BATCH_SIZE: usize = 100;

/// Page size used when listing remote children
pub const LIST_PAGE_SIZE: usize = 100;
