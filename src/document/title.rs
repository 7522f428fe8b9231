//! Page title resolution

/// Maximum title length in characters, ellipsis included
pub const MAX_TITLE_LENGTH: usize = 80;

/// First level-1 ATX heading of a markdown document, without the `# ` prefix.
pub fn extract_h1(markdown: &str) -> Option<&str> {
    markdown
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
}

/// Strip inline markup, collapse whitespace and truncate to
/// [`MAX_TITLE_LENGTH`] characters.
pub fn sanitize_title(raw: &str) -> String {
    let mut title = unwrap_links(raw);
    for (marker, forbidden) in [
        ("**", '*'),
        ("*", '*'),
        ("__", '_'),
        ("_", '_'),
        ("`", '`'),
        ("~~", '~'),
    ] {
        title = unwrap_pairs(&title, marker, forbidden);
    }

    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.chars().count() > MAX_TITLE_LENGTH {
        let mut truncated: String = title.chars().take(MAX_TITLE_LENGTH - 1).collect();
        truncated.push('…');
        truncated
    } else {
        title
    }
}

/// Title for a document: its sanitized first H1, else the sanitized fallback.
pub fn page_title(markdown: &str, fallback_name: &str) -> String {
    match extract_h1(markdown) {
        Some(h1) => sanitize_title(h1),
        None => sanitize_title(fallback_name),
    }
}

/// Replace `[text](target)` with `text`.
fn unwrap_links(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        let matched = after_open.find(']').and_then(|close| {
            let tail = after_open[close + 1..].strip_prefix('(')?;
            let end = tail.find(')')?;
            Some((&after_open[..close], &tail[end + 1..]))
        });
        match matched {
            Some((text, remaining)) => {
                out.push_str(&rest[..open]);
                out.push_str(text);
                rest = remaining;
            }
            None => {
                out.push_str(&rest[..open + 1]);
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replace `<marker>text<marker>` with `text`, where `text` never contains
/// `forbidden`.
fn unwrap_pairs(input: &str, marker: &str, forbidden: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(marker) {
        let body = &rest[start + marker.len()..];
        let close = body.find(forbidden).unwrap_or(body.len());
        if body[close..].starts_with(marker) {
            out.push_str(&rest[..start]);
            out.push_str(&body[..close]);
            rest = &body[close + marker.len()..];
        } else {
            let step = start + rest[start..].chars().next().map_or(1, char::len_utf8);
            out.push_str(&rest[..step]);
            rest = &rest[step..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_h1() {
        assert_eq!(extract_h1("intro\n  # Guide  \n# Second"), Some("Guide"));
        assert_eq!(extract_h1("## Only h2\ntext"), None);
        assert_eq!(extract_h1("#NoSpace"), None);
    }

    #[test]
    fn test_sanitize_strips_markup() {
        assert_eq!(
            sanitize_title("The **bold** and *it* `code` ~~old~~ [link](https://x.io)"),
            "The bold and it code old link"
        );
        assert_eq!(sanitize_title("__under__ _score_"), "under score");
        assert_eq!(sanitize_title("  spaced \t  out  "), "spaced out");
    }

    #[test]
    fn test_sanitize_leaves_unbalanced_markup() {
        assert_eq!(sanitize_title("a * b"), "a * b");
        assert_eq!(sanitize_title("[not a link]"), "[not a link]");
    }

    #[test]
    fn test_truncates_long_titles() {
        let long = "x".repeat(120);
        let title = sanitize_title(&long);
        assert_eq!(title.chars().count(), MAX_TITLE_LENGTH);
        assert!(title.ends_with('…'));
        assert_eq!(sanitize_title(&"y".repeat(80)).chars().count(), 80);
    }

    #[test]
    fn test_page_title_fallback() {
        assert_eq!(page_title("# Hello *World*", "file"), "Hello World");
        assert_eq!(page_title("no heading here", "getting-started"), "getting-started");
    }
}
