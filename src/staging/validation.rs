//! Validation of staged edits before they enter the store.
//!
//! `existing` is the set of file paths visible to the user, normally the
//! paths of the overlaid tree so that staged creates count as present.

use crate::error::ValidationError;
use crate::tree::path;
use crate::types::PendingChange;

/// Placeholder file that makes an otherwise empty folder visible to git.
pub const FOLDER_KEEP_FILE: &str = ".gitkeep";

/// Stage a new, empty file.
pub fn create_file(raw: &str, existing: &[String]) -> Result<PendingChange, ValidationError> {
    let target = path::validate(raw)?;
    if existing.iter().any(|p| *p == target) {
        return Err(ValidationError::TargetExists(target));
    }
    Ok(PendingChange::create(target, ""))
}

/// Stage a new folder as a create of its keep file.
pub fn create_folder(raw: &str, existing: &[String]) -> Result<PendingChange, ValidationError> {
    let folder = path::validate(raw)?;
    if existing.iter().any(|p| path::is_within(p, &folder)) {
        return Err(ValidationError::FolderExists(folder));
    }
    let keep = path::join(&folder, FOLDER_KEEP_FILE);
    Ok(PendingChange::create(keep, ""))
}

/// Stage a rename/move of a file or folder at `current` to `raw_target`.
pub fn rename(
    current: &str,
    raw_target: &str,
    existing: &[String],
    is_folder: bool,
) -> Result<PendingChange, ValidationError> {
    let target = path::validate(raw_target)?;
    let current = path::normalize(current);

    if target == current {
        return Err(ValidationError::SamePath);
    }
    if is_folder && path::is_within(&target, &current) {
        return Err(ValidationError::FolderIntoItself {
            from: current,
            to: target,
        });
    }
    if existing.iter().any(|p| *p == target) {
        return Err(ValidationError::TargetExists(target));
    }
    if is_folder && existing.iter().any(|p| path::is_within(p, &target)) {
        return Err(ValidationError::FolderExists(target));
    }

    Ok(if is_folder {
        PendingChange::move_folder(target, current)
    } else {
        PendingChange::move_file(target, current)
    })
}
