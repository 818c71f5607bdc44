//! Helpers for slash-separated storage paths.
//!
//! A path ending in `/` names a directory; anything else names a document.

/// Whether `path` names a directory.
pub fn is_dir(path: &str) -> bool {
    path.ends_with('/')
}

/// The chain of nodes from the root down to `path`.
///
/// `"/a/b/c"` becomes `["/", "a/", "b/", "c"]`.
pub fn path_parts(path: &str) -> Vec<String> {
    let mut parts = vec!["/".to_string()];
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.len().saturating_sub(1);
    for (index, segment) in segments.iter().enumerate() {
        if index < last || is_dir(path) {
            parts.push(format!("{}/", segment));
        } else {
            parts.push(segment.to_string());
        }
    }
    parts
}

/// The parent directory of `path`, or `None` for a root (`""` or `"/"`).
pub fn containing_dir(path: &str) -> Option<String> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let name_start = trimmed.rfind('/').map(|i| i + 1).unwrap_or(0);
    if name_start == trimmed.len() {
        return None;
    }
    Some(path[..name_start].to_string())
}

/// The last component of `path`, keeping the trailing `/` of directories.
pub fn base_name(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if is_dir(path) {
        let name = parts.len().checked_sub(2).map(|i| parts[i]).unwrap_or("");
        format!("{}/", name)
    } else {
        parts.last().copied().unwrap_or("").to_string()
    }
}
