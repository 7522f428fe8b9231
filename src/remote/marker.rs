//! Identity marker stamped as the first paragraph of every managed page.

const MARKER_PREFIX: &str = "<!--md-publish:";
const MARKER_SUFFIX: &str = "-->";

/// Marker text for a source path.
pub fn create_marker(source_path: &str) -> String {
    format!("{}{}{}", MARKER_PREFIX, source_path, MARKER_SUFFIX)
}

/// Source path carried by a marker, or `None` if `text` is not a marker.
pub fn extract_source_path_from_marker(text: &str) -> Option<&str> {
    text.strip_prefix(MARKER_PREFIX)?.strip_suffix(MARKER_SUFFIX)
}

/// Whether `text` is the marker for `source_path`.
pub fn is_marker_for(text: &str, source_path: &str) -> bool {
    extract_source_path_from_marker(text) == Some(source_path)
}
