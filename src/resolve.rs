//! Relative-path resolution for document links and assets
//!
//! References found in a rendered document are resolved against the
//! directory containing that document. Navigation links become in-app
//! routes; asset references are additionally routed through the remote
//! file-content endpoint. The two post-processing steps stay separate so
//! in-app routes never pick up the asset prefix.
//!
//! Path math here is a display convenience, not a security boundary:
//! climbing above the root clamps at the root.

use crate::tree::path;

/// Default file-content endpoint prefix for assets.
pub const DEFAULT_ASSET_PREFIX: &str = "/api/file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Has a scheme (`://`) or is protocol-relative (`//`)
    External,
    /// Starts with `/`
    Absolute,
    Relative,
}

pub fn classify(reference: &str) -> ReferenceKind {
    if reference.contains("://") || reference.starts_with("//") {
        ReferenceKind::External
    } else if reference.starts_with('/') {
        ReferenceKind::Absolute
    } else {
        ReferenceKind::Relative
    }
}

/// Resolve `reference` against `base_path`, the directory of the current document.
pub fn resolve(reference: &str, base_path: Option<&str>) -> String {
    match classify(reference) {
        ReferenceKind::External | ReferenceKind::Absolute => return reference.to_string(),
        ReferenceKind::Relative => {}
    }

    let reference = reference.strip_prefix("./").unwrap_or(reference);
    let base = match base_path.map(path::trim_slashes) {
        Some(base) if !base.is_empty() => base,
        _ => return format!("/{}", reference),
    };

    if reference.starts_with("../") {
        let mut rest = reference;
        let mut levels = 0;
        while let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
            levels += 1;
        }
        let segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
        let keep = segments.len().saturating_sub(levels);
        let mut parts: Vec<&str> = segments[..keep].to_vec();
        if !rest.is_empty() {
            parts.push(rest);
        }
        return format!("/{}", parts.join("/"));
    }

    format!("/{}/{}", base, reference)
}

/// Resolve a navigation link to an in-app route.
pub fn resolve_link(reference: &str, base_path: Option<&str>) -> String {
    resolve(reference, base_path)
}

/// Resolve an image/asset reference to a fetchable URL.
///
/// External references pass through untouched; everything else is served
/// from `asset_prefix`.
pub fn resolve_asset(reference: &str, base_path: Option<&str>, asset_prefix: &str) -> String {
    if classify(reference) == ReferenceKind::External {
        return reference.to_string();
    }
    let resolved = resolve(reference, base_path);
    format!("{}{}", asset_prefix.trim_end_matches('/'), resolved)
}

/// Directory containing a document; empty for root-level documents.
pub fn document_base(document_path: &str) -> String {
    let canonical = path::normalize(document_path);
    path::parent(&canonical).unwrap_or_default().to_string()
}
