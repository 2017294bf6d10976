//! Remote path helpers.
//!
//! Remote paths are always absolute, `/`-separated and carry no trailing
//! slash, except for the root itself which is `/`.

/// Strip every trailing `/`. The root collapses to the empty string.
pub fn trim_trailing_slashes(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Split a path into its segments, ignoring leading, trailing and doubled
/// slashes. The empty path and `/` both denote the root (no segments).
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize a path (remove trailing slashes, handle //, force leading /).
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path_segments(path).join("/"))
}

/// Join a child name onto a remote directory with exactly one separator.
pub fn join_remote(dir: &str, name: &str) -> String {
    let dir = trim_trailing_slashes(dir);
    let name = name.trim_start_matches('/');
    format!("{}/{}", dir, name)
}

/// Path made of the first `count` segments.
pub(crate) fn prefix_path(segments: &[String], count: usize) -> String {
    format!("/{}", segments[..count].join("/"))
}
