//! Folio: staged editing for git-backed document repositories
//!
//! Edits are staged locally in a pending-change log, overlaid on the remote
//! tree for display, and flushed to the repository service as one ordered
//! commit. Relative links and assets inside documents resolve against the
//! document's directory.

pub mod commit;
pub mod config;
pub mod error;
pub mod logging;
pub mod remote;
pub mod resolve;
pub mod session;
pub mod staging;
pub mod tooling;
pub mod tree;
pub mod types;
