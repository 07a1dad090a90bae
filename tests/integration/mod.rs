//! Integration tests for the folio editing core

mod cli_contracts;
mod commit_pipeline;
mod editing_flow;
mod properties;
