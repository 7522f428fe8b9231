//! Markdown translation
//!
//! Turns document text into the block model the remote store accepts:
//! the lexer splits the text into block tokens, each token becomes zero or
//! more [`Block`]s and every text payload is inline-parsed and chunked.

pub mod block;
pub mod inline;
pub mod language;
pub mod lexer;

pub use block::{Block, Emphasis, HeadingLevel, RichText};
pub use inline::parse_inline;
pub use language::normalize_language;
pub use lexer::{lex, Token};

use block::{chunk_text, TableRow};

/// Translate a markdown document into content blocks.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    lex(markdown).into_iter().flat_map(token_to_blocks).collect()
}

/// Translate one block token.
pub fn token_to_blocks(token: Token) -> Vec<Block> {
    match token {
        Token::Heading { depth, text } => vec![Block::Heading {
            level: HeadingLevel::from_depth(depth),
            rich_text: parse_inline(&text),
        }],
        Token::Paragraph { text } => vec![Block::Paragraph {
            rich_text: parse_inline(&text),
        }],
        Token::List { ordered, items } => items
            .iter()
            .map(|item| {
                let rich_text = parse_inline(item);
                if ordered {
                    Block::NumberedItem { rich_text }
                } else {
                    Block::BulletedItem { rich_text }
                }
            })
            .collect(),
        Token::Code { lang, text } => vec![Block::Code {
            language: normalize_language(lang.as_deref().unwrap_or_default()).to_string(),
            rich_text: chunk_text(&text, Emphasis::PLAIN, None),
        }],
        Token::BlockQuote { text } => vec![Block::Quote {
            rich_text: parse_inline(&text),
        }],
        Token::Rule => vec![Block::Divider],
        Token::Table { header, rows } => table_block(header, rows).into_iter().collect(),
        Token::Space => Vec::new(),
    }
}

fn table_block(header: Vec<String>, rows: Vec<Vec<String>>) -> Option<Block> {
    let width = header.len();
    if width == 0 {
        return None;
    }

    let rows = std::iter::once(header)
        .chain(rows)
        .map(|cells| table_row(cells, width))
        .collect();

    Some(Block::Table {
        width,
        has_header: true,
        rows,
    })
}

fn table_row(mut cells: Vec<String>, width: usize) -> TableRow {
    cells.resize(width, String::new());
    cells.iter().map(|cell| parse_inline(cell)).collect()
}
