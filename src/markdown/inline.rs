//! Inline markup parsing
//!
//! Scans left to right for the earliest of bold, italic, inline code,
//! strikethrough and link. Matches never nest: markup inside a match is kept
//! literally. When two patterns start at the same offset the one listed first
//! in [`PATTERNS`] wins.

use super::block::{chunk_text, plain_spans, Emphasis, RichText};

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Delimited(&'static str, Emphasis),
    Link,
}

const PATTERNS: [Pattern; 5] = [
    Pattern::Delimited("**", Emphasis::BOLD),
    Pattern::Delimited("*", Emphasis::ITALIC),
    Pattern::Delimited("`", Emphasis::CODE),
    Pattern::Delimited("~~", Emphasis::STRIKETHROUGH),
    Pattern::Link,
];

/// A located inline match, offsets in bytes into the scanned text.
#[derive(Debug, PartialEq, Eq)]
struct InlineMatch<'a> {
    start: usize,
    end: usize,
    content: &'a str,
    emphasis: Emphasis,
    url: Option<&'a str>,
}

/// Parse inline markup into rich-text spans.
pub fn parse_inline(text: &str) -> Vec<RichText> {
    let mut spans = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let earliest = PATTERNS
            .iter()
            .filter_map(|pattern| find_pattern(rest, *pattern))
            .fold(None, |best: Option<InlineMatch<'_>>, m| match best {
                Some(b) if b.start <= m.start => Some(b),
                _ => Some(m),
            });

        let Some(m) = earliest else {
            spans.extend(plain_spans(rest));
            break;
        };

        spans.extend(plain_spans(&rest[..m.start]));
        let link = m.url.filter(|url| is_web_url(url));
        spans.extend(chunk_text(m.content, m.emphasis, link));
        rest = &rest[m.end..];
    }

    spans
}

/// Links only keep `http` and `https` targets.
fn is_web_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn find_pattern(text: &str, pattern: Pattern) -> Option<InlineMatch<'_>> {
    match pattern {
        Pattern::Delimited(delim, emphasis) => find_delimited(text, delim, emphasis),
        Pattern::Link => find_link(text),
    }
}

/// Leftmost `<delim>content<delim>` with non-empty content, closing at the
/// nearest delimiter.
fn find_delimited<'a>(text: &'a str, delim: &str, emphasis: Emphasis) -> Option<InlineMatch<'a>> {
    let mut from = 0;
    while let Some(offset) = text[from..].find(delim) {
        let start = from + offset;
        let body_start = start + delim.len();
        let first_len = text[body_start..].chars().next().map(char::len_utf8)?;
        let search_from = body_start + first_len;
        if let Some(close) = text[search_from..].find(delim) {
            let content_end = search_from + close;
            return Some(InlineMatch {
                start,
                end: content_end + delim.len(),
                content: &text[body_start..content_end],
                emphasis,
                url: None,
            });
        }
        from = start + 1;
    }
    None
}

/// Leftmost `[text](url)` with non-empty text and url.
fn find_link(text: &str) -> Option<InlineMatch<'_>> {
    let mut from = 0;
    while let Some(offset) = text[from..].find('[') {
        let start = from + offset;
        if let Some(m) = link_at(text, start) {
            return Some(m);
        }
        from = start + 1;
    }
    None
}

fn link_at(text: &str, start: usize) -> Option<InlineMatch<'_>> {
    let label_start = start + 1;
    let label_len = text[label_start..].find(']')?;
    if label_len == 0 {
        return None;
    }
    let label_end = label_start + label_len;
    let url_start = label_end + 2;
    if !text[label_end + 1..].starts_with('(') {
        return None;
    }
    let url_len = text[url_start..].find(')')?;
    if url_len == 0 {
        return None;
    }
    let url_end = url_start + url_len;
    Some(InlineMatch {
        start,
        end: url_end + 1,
        content: &text[label_start..label_end],
        emphasis: Emphasis::PLAIN,
        url: Some(&text[url_start..url_end]),
    })
}
