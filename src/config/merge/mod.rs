//! Source composition for configuration loading.

mod merge_policy;
pub mod service;
