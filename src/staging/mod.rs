//! Staging
//!
//! In-memory log of not-yet-committed edits for one editing session, plus the
//! checks applied to user-entered paths before an edit is staged.

mod store;
pub mod validation;

pub use store::PendingChangeStore;
