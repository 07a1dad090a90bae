//! Integration tests for folio

mod integration;
