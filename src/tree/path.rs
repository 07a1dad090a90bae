//! Repository path helpers
//!
//! Canonical paths are repository-relative, `/`-separated, NFC-normalized and
//! carry no leading or trailing slash, no empty or `.` segments and no `..`.

use crate::error::ValidationError;
use unicode_normalization::UnicodeNormalization;

/// Characters a staged path may not contain.
pub const RESERVED_CHARS: &[char] = &['\\', ':', '*', '?', '"', '<', '>', '|'];

/// Strip leading and trailing slashes.
pub fn trim_slashes(path: &str) -> &str {
    path.trim_matches('/')
}

/// Canonicalize a path. Total: `..` segments are collapsed and clamp at the root.
pub fn normalize(path: &str) -> String {
    let composed: String = path.nfc().collect();
    let mut segments: Vec<&str> = Vec::new();
    for segment in composed.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Validate user input for a staged path and return its canonical form.
pub fn validate(path: &str) -> Result<String, ValidationError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    if trimmed.contains("..") {
        return Err(ValidationError::PathTraversal(trimmed.to_string()));
    }
    if let Some(character) = trimmed
        .chars()
        .find(|c| RESERVED_CHARS.contains(c) || c.is_control())
    {
        return Err(ValidationError::ReservedCharacter {
            path: trimmed.to_string(),
            character,
        });
    }
    let canonical = normalize(trimmed);
    if canonical.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    Ok(canonical)
}

/// Last segment of a path.
pub fn basename(path: &str) -> &str {
    let path = trim_slashes(path);
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Parent directory, `None` for root-level entries.
pub fn parent(path: &str) -> Option<&str> {
    let path = trim_slashes(path);
    path.rfind('/').map(|idx| &path[..idx])
}

/// Join two path fragments with a single slash.
pub fn join(base: &str, name: &str) -> String {
    let base = trim_slashes(base);
    let name = trim_slashes(name);
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, name),
    }
}

/// True when `path` lies strictly inside `folder`.
pub fn is_within(path: &str, folder: &str) -> bool {
    let folder = trim_slashes(folder);
    !folder.is_empty()
        && path.len() > folder.len() + 1
        && path.starts_with(folder)
        && path.as_bytes()[folder.len()] == b'/'
}

/// Rewrite a path under `from` to live under `to`. Paths outside `from` are returned as-is.
pub fn rebase(path: &str, from: &str, to: &str) -> String {
    if path == from {
        return to.to_string();
    }
    if is_within(path, from) {
        return join(to, &path[from.len() + 1..]);
    }
    path.to_string()
}

/// Ancestor directories of a path, outermost first (`a/b/c` -> `a`, `a/b`).
pub fn ancestors(path: &str) -> Vec<&str> {
    let path = trim_slashes(path);
    path.match_indices('/').map(|(idx, _)| &path[..idx]).collect()
}
