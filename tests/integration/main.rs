//! Integration tests for Trawl
//!
//! Each module drives the public API against wiremock servers.

mod common;
mod crawl_tests;
mod search_tests;
