//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with typed failures
//! - HTML parsing into an index-addressed page tree
//! - Emphasis-weighted traversal, tokenization and link extraction
//! - The shared frontier and the bounded worker pool driving it

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod traversal;

pub use coordinator::{run_crawl, CrawlReport, Crawler};
pub use fetcher::{build_http_client, fetch_page, FetchError};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{parse_document, NodeIdx, NodeKind, PageNode, PageTree, ParseError};
pub use traversal::{is_ignored, scan_page, Handler, PageScan};

use thiserror::Error;

/// A failure that costs a single page and nothing else
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}

impl PageError {
    /// Short label used to group skipped pages in reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(FetchError::Timeout) => "timeout",
            Self::Fetch(FetchError::Network(_)) => "network",
            Self::Fetch(FetchError::Status { .. }) => "status",
            Self::Fetch(FetchError::ContentMismatch { .. }) => "content-type",
            Self::Fetch(FetchError::UnsupportedScheme(_)) => "scheme",
            Self::Fetch(FetchError::Body(_)) => "body",
            Self::Parse(_) => "parse",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_retryable(),
            Self::Parse(_) => false,
        }
    }
}
