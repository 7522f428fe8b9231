//! Source path normalization
//!
//! A source path is the forward-slash, root-relative identifier of a file or
//! directory. The empty string is the tree root. Source paths are the only
//! identity shared by the document tree, the hash tree and the remote index.

use crate::error::ApiError;
use std::path::{Component, Path};
use unicode_normalization::UnicodeNormalization;

/// Convert a path relative to `src_root` into a source path.
///
/// Components are joined with `/` regardless of platform and NFC-normalized so
/// that the same file yields the same identifier on every filesystem.
pub fn source_path_of(path: &Path, src_root: &Path) -> Result<String, ApiError> {
    let relative = path.strip_prefix(src_root).map_err(|_| {
        ApiError::ValidationError(format!(
            "{} is not under source root {}",
            path.display(),
            src_root.display()
        ))
    })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name.to_str().ok_or_else(|| {
                    ApiError::ValidationError(format!(
                        "Non UTF-8 path component in {}",
                        path.display()
                    ))
                })?;
                segments.push(name.nfc().collect::<String>());
            }
            Component::CurDir => {}
            _ => {
                return Err(ApiError::ValidationError(format!(
                    "Path {} escapes source root",
                    path.display()
                )))
            }
        }
    }

    Ok(segments.join("/"))
}

/// Whether `source_path` is a well-formed source path: relative, not hidden
/// at the top level, and free of `..` segments.
pub fn is_valid_source_path(source_path: &str) -> bool {
    !(source_path.starts_with('/')
        || source_path.starts_with('.')
        || source_path.split('/').any(|segment| segment == ".."))
}

/// Return `Ok` for a well-formed source path, a `ValidationError` otherwise.
pub fn validate_source_path(source_path: &str) -> Result<(), ApiError> {
    if is_valid_source_path(source_path) {
        Ok(())
    } else {
        Err(ApiError::ValidationError(format!(
            "Invalid source path: {:?}",
            source_path
        )))
    }
}

/// Parent source path; `None` for top-level entries and the root.
pub fn parent_source_path(source_path: &str) -> Option<&str> {
    source_path.rfind('/').map(|idx| &source_path[..idx])
}

/// Last path segment.
pub fn base_name(source_path: &str) -> &str {
    match source_path.rfind('/') {
        Some(idx) => &source_path[idx + 1..],
        None => source_path,
    }
}

/// Last path segment with a trailing `.md` (any case) removed.
pub fn base_name_without_ext(source_path: &str) -> &str {
    let name = base_name(source_path);
    if is_markdown(name) {
        &name[..name.len() - 3]
    } else {
        name
    }
}

/// Whether the path names a markdown file.
pub fn is_markdown(source_path: &str) -> bool {
    source_path.len() >= 3
        && source_path.is_char_boundary(source_path.len() - 3)
        && source_path[source_path.len() - 3..].eq_ignore_ascii_case(".md")
}

/// Whether the path names a directory README.
pub fn is_readme(source_path: &str) -> bool {
    base_name(source_path).eq_ignore_ascii_case("readme.md")
}

/// Directory a source path belongs to: the parent for markdown files, the
/// path itself otherwise.
pub fn dir_source_path(source_path: &str) -> &str {
    if is_markdown(source_path) {
        parent_source_path(source_path).unwrap_or("")
    } else {
        source_path
    }
}

/// Every proper ancestor of a source path, nearest first, ending with the root.
pub fn ancestors(source_path: &str) -> impl Iterator<Item = &str> {
    let mut current = if source_path.is_empty() {
        None
    } else {
        Some(source_path)
    };
    std::iter::from_fn(move || {
        let path = current?;
        let parent = parent_source_path(path).unwrap_or("");
        current = if parent.is_empty() { None } else { Some(parent) };
        Some(parent)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_source_path_of_nested_file() {
        let root = PathBuf::from("/docs");
        let file = root.join("guide").join("intro.md");
        assert_eq!(source_path_of(&file, &root).unwrap(), "guide/intro.md");
        assert_eq!(source_path_of(&root, &root).unwrap(), "");
    }

    #[test]
    fn test_source_path_outside_root_is_rejected() {
        let err = source_path_of(Path::new("/elsewhere/a.md"), Path::new("/docs"));
        assert!(matches!(err, Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_source_path_is_nfc_normalized() {
        let root = PathBuf::from("/docs");
        let decomposed = root.join("cafe\u{301}.md");
        assert_eq!(source_path_of(&decomposed, &root).unwrap(), "caf\u{e9}.md");
    }

    #[test]
    fn test_validity() {
        assert!(is_valid_source_path(""));
        assert!(is_valid_source_path("a/b.md"));
        assert!(!is_valid_source_path("/a"));
        assert!(!is_valid_source_path(".hidden/a.md"));
        assert!(!is_valid_source_path("a/../b.md"));
        assert!(!is_valid_source_path("a/.."));
        assert!(is_valid_source_path("notes/v1..2.md"));
        assert!(is_valid_source_path("a..b/c.md"));
    }

    #[test]
    fn test_names() {
        assert_eq!(parent_source_path("a/b/c.md"), Some("a/b"));
        assert_eq!(parent_source_path("c.md"), None);
        assert_eq!(base_name("a/b/c.md"), "c.md");
        assert_eq!(base_name_without_ext("a/b/Guide.MD"), "Guide");
        assert_eq!(base_name_without_ext("a/b"), "b");
        assert!(is_readme("docs/ReadMe.md"));
        assert!(!is_readme("docs/readme.txt"));
        assert_eq!(dir_source_path("docs/guide.md"), "docs");
        assert_eq!(dir_source_path("guide.md"), "");
        assert_eq!(dir_source_path("docs/sub"), "docs/sub");
    }

    #[test]
    fn test_ancestors() {
        let all: Vec<&str> = ancestors("a/b/c.md").collect();
        assert_eq!(all, vec!["a/b", "a", ""]);
        assert_eq!(ancestors("top.md").collect::<Vec<_>>(), vec![""]);
        assert_eq!(ancestors("").count(), 0);
    }
}
