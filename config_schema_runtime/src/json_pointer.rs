//! JSON Pointer helpers (RFC 6901).
//!
//! Pointers locate one value within a document: schema issues are reported
//! with them and validation errors use them to find the offending node.
//! Segments are `/`-separated, with `~` escaped as `~0` and `/` escaped as `~1`.

/// Escapes one key or index so it can be used as a pointer segment.
#[must_use]
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Extends `pointer` by one segment, escaping it.
#[must_use]
pub fn format(pointer: &str, segment: &str) -> String {
    format!("{pointer}/{}", escape_segment(segment))
}

/// Undoes RFC 6901 escaping for a single segment.
///
/// `~1` is decoded before `~0` so that `~01` yields `~1` and not `/`.
#[must_use]
pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Splits a pointer into unescaped segments.
///
/// The empty pointer addresses the whole document and yields no segments.
/// Returns `None` when a non-empty pointer does not start with `/`.
#[must_use]
pub fn segments(pointer: &str) -> Option<Vec<String>> {
    if pointer.is_empty() {
        return Some(Vec::new());
    }
    let rest: &str = pointer.strip_prefix('/')?;
    Some(rest.split('/').map(unescape_segment).collect())
}

/// Renders a pointer for humans: the document root is shown as `(root)`.
#[must_use]
pub fn display(pointer: &str) -> &str {
    if pointer.is_empty() { "(root)" } else { pointer }
}
