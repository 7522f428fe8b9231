//! Block-level markdown lexer
//!
//! Line-oriented tokenizer for the common markdown subset: ATX and setext
//! headings, paragraphs, bullet and ordered lists, fenced and indented code,
//! blockquotes, thematic breaks and pipe tables.

/// A block-level token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Heading { depth: usize, text: String },
    Paragraph { text: String },
    List { ordered: bool, items: Vec<String> },
    Code { lang: Option<String>, text: String },
    BlockQuote { text: String },
    Rule,
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
    Space,
}

/// Tokenize a markdown document.
pub fn lex(markdown: &str) -> Vec<Token> {
    let normalized = markdown.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.lines().collect();
    Lexer { lines, pos: 0 }.run()
}

struct Lexer<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            let token = if is_blank(line) {
                self.blank()
            } else if let Some(fence) = fence_open(line) {
                self.fenced_code(fence)
            } else if let Some((depth, text)) = atx_heading(line) {
                self.pos += 1;
                Token::Heading { depth, text }
            } else if is_rule(line) {
                self.pos += 1;
                Token::Rule
            } else if indent_width(line) >= 4 {
                self.indented_code()
            } else if blockquote_body(line).is_some() {
                self.blockquote()
            } else if let Some(marker) = list_marker(line) {
                self.list(marker.ordered)
            } else if let Some(header) = self.table_header() {
                self.table(header)
            } else {
                self.paragraph()
            };
            tokens.push(token);
        }
        tokens
    }

    fn peek(&self, offset: usize) -> Option<&'a str> {
        self.lines.get(self.pos + offset).copied()
    }

    fn blank(&mut self) -> Token {
        while self.peek(0).is_some_and(is_blank) {
            self.pos += 1;
        }
        Token::Space
    }

    fn fenced_code(&mut self, fence: Fence) -> Token {
        self.pos += 1;
        let mut body = Vec::new();
        while let Some(line) = self.peek(0) {
            self.pos += 1;
            if fence.is_closed_by(line) {
                break;
            }
            body.push(strip_indent(line, fence.indent));
        }
        Token::Code {
            lang: fence.lang,
            text: body.join("\n"),
        }
    }

    fn indented_code(&mut self) -> Token {
        let mut body: Vec<&str> = Vec::new();
        while let Some(line) = self.peek(0) {
            if is_blank(line) {
                // Blank lines belong to the block only if more code follows.
                let more = self.lines[self.pos..]
                    .iter()
                    .find(|l| !is_blank(l))
                    .is_some_and(|l| indent_width(l) >= 4);
                if !more {
                    break;
                }
                body.push("");
            } else if indent_width(line) >= 4 {
                body.push(strip_indent(line, 4));
            } else {
                break;
            }
            self.pos += 1;
        }
        Token::Code {
            lang: None,
            text: body.join("\n"),
        }
    }

    fn blockquote(&mut self) -> Token {
        let mut body = Vec::new();
        while let Some(line) = self.peek(0) {
            match blockquote_body(line) {
                Some(inner) => body.push(inner),
                // Lazy continuation of a quoted paragraph.
                None if !is_blank(line) && !body.last().is_some_and(|l| is_blank(l)) && !self.interrupts(line) => {
                    body.push(line.trim())
                }
                None => break,
            }
            self.pos += 1;
        }
        Token::BlockQuote {
            text: body.join("\n").trim().to_string(),
        }
    }

    fn list(&mut self, ordered: bool) -> Token {
        let mut items: Vec<Vec<&str>> = Vec::new();
        let mut content_indent = 0;

        while let Some(line) = self.peek(0) {
            if is_rule(line) && indent_width(line) < content_indent.max(1) {
                break;
            }
            let starts_item = |m: &ListMarker| m.ordered == ordered && (items.is_empty() || m.indent < content_indent);
            if let Some(marker) = list_marker(line).filter(starts_item) {
                items.push(vec![&line[marker.content_start..]]);
                content_indent = marker.content_start;
            } else if is_blank(line) {
                let next = self.lines[self.pos..].iter().find(|l| !is_blank(l));
                let continues = next.is_some_and(|l| {
                    indent_width(l) >= content_indent
                        || list_marker(l).is_some_and(|m| m.ordered == ordered && m.indent < content_indent)
                });
                if !continues {
                    break;
                }
                if let Some(item) = items.last_mut() {
                    item.push("");
                }
            } else if indent_width(line) >= content_indent {
                if let Some(item) = items.last_mut() {
                    item.push(strip_indent(line, content_indent));
                }
            } else if !self.interrupts(line) && items.last().is_some_and(|i| !i.last().is_some_and(|l| l.is_empty())) {
                // Lazy continuation line.
                if let Some(item) = items.last_mut() {
                    item.push(line.trim());
                }
            } else {
                break;
            }
            self.pos += 1;
        }

        Token::List {
            ordered,
            items: items
                .into_iter()
                .map(|lines| lines.join("\n").trim().to_string())
                .collect(),
        }
    }

    fn table_header(&self) -> Option<Vec<String>> {
        let header = self.peek(0)?;
        let delimiter = self.peek(1)?;
        if !header.contains('|') || !is_table_delimiter(delimiter) {
            return None;
        }
        let cells = split_row(header);
        if cells.len() != split_row(delimiter).len() {
            return None;
        }
        Some(cells)
    }

    fn table(&mut self, header: Vec<String>) -> Token {
        self.pos += 2;
        let mut rows = Vec::new();
        while let Some(line) = self.peek(0) {
            if is_blank(line) || !line.contains('|') {
                break;
            }
            rows.push(split_row(line));
            self.pos += 1;
        }
        Token::Table { header, rows }
    }

    fn paragraph(&mut self) -> Token {
        let mut body = vec![self.lines[self.pos].trim()];
        self.pos += 1;
        while let Some(line) = self.peek(0) {
            if is_blank(line) {
                break;
            }
            if let Some(depth) = setext_depth(line) {
                self.pos += 1;
                return Token::Heading {
                    depth,
                    text: body.join("\n"),
                };
            }
            if self.interrupts(line) {
                break;
            }
            body.push(line.trim());
            self.pos += 1;
        }
        Token::Paragraph {
            text: body.join("\n"),
        }
    }

    /// Whether `line` starts a block that ends a running paragraph.
    fn interrupts(&self, line: &str) -> bool {
        fence_open(line).is_some()
            || atx_heading(line).is_some()
            || is_rule(line)
            || blockquote_body(line).is_some()
            || list_marker(line).is_some()
    }
}

struct Fence {
    marker: char,
    len: usize,
    indent: usize,
    lang: Option<String>,
}

impl Fence {
    fn is_closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim();
        indent_width(line) < 4
            && trimmed.chars().all(|c| c == self.marker)
            && trimmed.chars().count() >= self.len
    }
}

fn fence_open(line: &str) -> Option<Fence> {
    let indent = indent_width(line);
    if indent >= 4 {
        return None;
    }
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    let info = trimmed[len..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }
    let lang = info
        .split_whitespace()
        .next()
        .map(str::to_string);
    Some(Fence {
        marker,
        len,
        indent,
        lang,
    })
}

fn atx_heading(line: &str) -> Option<(usize, String)> {
    if indent_width(line) >= 4 {
        return None;
    }
    let trimmed = line.trim();
    let depth = trimmed.chars().take_while(|c| *c == '#').count();
    if depth == 0 || depth > 6 {
        return None;
    }
    let rest = &trimmed[depth..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let mut text = rest.trim();
    // Optional closing sequence: spaces followed by #s only.
    let without_hashes = text.trim_end_matches('#');
    if without_hashes.is_empty() || without_hashes.ends_with([' ', '\t']) {
        text = without_hashes.trim_end();
    }
    Some((depth, text.to_string()))
}

fn setext_depth(line: &str) -> Option<usize> {
    if indent_width(line) >= 4 {
        return None;
    }
    let trimmed = line.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c == '=') {
        Some(1)
    } else if !trimmed.is_empty() && trimmed.chars().all(|c| c == '-') {
        Some(2)
    } else {
        None
    }
}

fn is_rule(line: &str) -> bool {
    if indent_width(line) >= 4 {
        return false;
    }
    let compact: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && matches!(compact[0], '-' | '*' | '_')
        && compact.iter().all(|c| *c == compact[0])
}

fn blockquote_body(line: &str) -> Option<&str> {
    if indent_width(line) >= 4 {
        return None;
    }
    let rest = line.trim_start().strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

struct ListMarker {
    ordered: bool,
    indent: usize,
    /// Byte offset where item content starts
    content_start: usize,
}

fn list_marker(line: &str) -> Option<ListMarker> {
    let indent = indent_width(line);
    if indent >= 4 {
        return None;
    }
    let trimmed = line.trim_start_matches([' ', '\t']);
    let leading = line.len() - trimmed.len();

    let (ordered, marker_len) = match trimmed.chars().next()? {
        '-' | '*' | '+' => (false, 1),
        c if c.is_ascii_digit() => {
            let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
            if digits > 9 || !trimmed[digits..].starts_with(['.', ')']) {
                return None;
            }
            (true, digits + 1)
        }
        _ => return None,
    };

    let after = &trimmed[marker_len..];
    if after.is_empty() {
        return Some(ListMarker {
            ordered,
            indent,
            content_start: line.len(),
        });
    }
    if !after.starts_with([' ', '\t']) {
        return None;
    }
    // Only ASCII blanks separate the marker; other whitespace is content.
    let spaces = after.len() - after.trim_start_matches([' ', '\t']).len();
    Some(ListMarker {
        ordered,
        indent,
        content_start: leading + marker_len + spaces.min(4),
    })
}

fn is_table_delimiter(line: &str) -> bool {
    let cells = split_row(line);
    !cells.is_empty()
        && line.contains('-')
        && cells.iter().all(|cell| {
            let inner = cell.trim_start_matches(':').trim_end_matches(':');
            !inner.is_empty() && inner.chars().all(|c| c == '-')
        })
}

/// Split a pipe-table row into trimmed cells, honoring `\|` escapes.
fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = match trimmed.strip_suffix('|') {
        Some(inner) if !inner.ends_with('\\') => inner,
        _ => trimmed,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Leading whitespace width, tabs counting as four columns.
fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Remove up to `width` columns of leading whitespace.
fn strip_indent(line: &str, width: usize) -> &str {
    let mut columns = 0;
    for (idx, c) in line.char_indices() {
        if columns >= width {
            return &line[idx..];
        }
        match c {
            ' ' => columns += 1,
            '\t' => columns += 4,
            _ => return &line[idx..],
        }
    }
    ""
}
