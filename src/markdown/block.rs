//! Block model understood by the remote store.

use crate::types::MAX_SPAN_LEN;
use serde::{Deserialize, Serialize};

/// Emphasis flags of a rich-text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub code: bool,
}

impl Emphasis {
    pub const PLAIN: Emphasis = Emphasis {
        bold: false,
        italic: false,
        strikethrough: false,
        code: false,
    };
    pub const BOLD: Emphasis = Emphasis {
        bold: true,
        ..Emphasis::PLAIN
    };
    pub const ITALIC: Emphasis = Emphasis {
        italic: true,
        ..Emphasis::PLAIN
    };
    pub const STRIKETHROUGH: Emphasis = Emphasis {
        strikethrough: true,
        ..Emphasis::PLAIN
    };
    pub const CODE: Emphasis = Emphasis {
        code: true,
        ..Emphasis::PLAIN
    };

    pub fn is_plain(&self) -> bool {
        *self == Emphasis::PLAIN
    }
}

/// A run of text with uniform emphasis and an optional link target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    pub text: String,
    pub link: Option<String>,
    pub emphasis: Emphasis,
}

impl RichText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
            emphasis: Emphasis::PLAIN,
        }
    }
}

/// Split `text` into spans of at most [`MAX_SPAN_LEN`] UTF-16 code units,
/// all carrying the same emphasis and link. Cuts fall on character
/// boundaries. Empty text yields no spans.
pub fn chunk_text(text: &str, emphasis: Emphasis, link: Option<&str>) -> Vec<RichText> {
    let mut spans = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let cut = span_end(rest);
        spans.push(RichText {
            text: rest[..cut].to_string(),
            link: link.map(str::to_string),
            emphasis,
        });
        rest = &rest[cut..];
    }
    spans
}

/// Byte offset of the longest prefix that fits in one span.
fn span_end(text: &str) -> usize {
    let mut units = 0;
    for (idx, c) in text.char_indices() {
        units += c.len_utf16();
        if units > MAX_SPAN_LEN {
            // A single character never exceeds the limit, so idx > 0.
            return idx;
        }
    }
    text.len()
}

/// Plain spans for unformatted text.
pub fn plain_spans(text: &str) -> Vec<RichText> {
    chunk_text(text, Emphasis::PLAIN, None)
}

/// Heading level, clamped to the three levels the store supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a markdown heading depth; depths of 4 and more become `H3`.
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }
}

/// One table row: a list of cells, each a list of spans.
pub type TableRow = Vec<Vec<RichText>>;

/// A content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Heading {
        level: HeadingLevel,
        rich_text: Vec<RichText>,
    },
    Paragraph {
        rich_text: Vec<RichText>,
    },
    BulletedItem {
        rich_text: Vec<RichText>,
    },
    NumberedItem {
        rich_text: Vec<RichText>,
    },
    Code {
        language: String,
        rich_text: Vec<RichText>,
    },
    Quote {
        rich_text: Vec<RichText>,
    },
    Divider,
    Table {
        width: usize,
        has_header: bool,
        rows: Vec<TableRow>,
    },
    /// A row appended to an existing table
    TableRow {
        cells: TableRow,
    },
}

impl Block {
    /// Paragraph made of plain text, chunked to the span limit.
    pub fn plain_paragraph(text: &str) -> Self {
        Block::Paragraph {
            rich_text: plain_spans(text),
        }
    }

    /// Spans of the block; empty for dividers and table blocks.
    pub fn rich_text(&self) -> &[RichText] {
        match self {
            Block::Heading { rich_text, .. }
            | Block::Paragraph { rich_text }
            | Block::BulletedItem { rich_text }
            | Block::NumberedItem { rich_text }
            | Block::Code { rich_text, .. }
            | Block::Quote { rich_text } => rich_text,
            Block::Divider | Block::Table { .. } | Block::TableRow { .. } => &[],
        }
    }

    /// Concatenated text of all spans.
    pub fn plain_text(&self) -> String {
        self.rich_text().iter().map(|s| s.text.as_str()).collect()
    }
}
