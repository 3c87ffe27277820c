//! Trawl: a small web search engine pipeline
//!
//! This crate crawls pages from a frontier of seed URLs, extracts
//! emphasis-weighted words and outbound links from each page, builds a
//! lexicon, an inverted index and a link graph, scores documents with
//! PageRank and answers single-word queries ordered by that score.

pub mod config;
pub mod crawler;
pub mod index;
pub mod output;
pub mod rank;
pub mod search;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Dense identifier of a document (one per normalized URL), starting at 1
pub type DocId = i64;

/// Dense identifier of a lexicon word, starting at 1
pub type WordId = i64;

/// Main error type for Trawl operations
///
/// Everything in here is fatal for the operation that produced it. Failures
/// that only cost a single page are reported through [`crawler::PageError`].
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Failed to read seed file {path}: {source}")]
    SeedFile {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Crawler};
pub use index::SearchIndex;
pub use search::QueryEngine;
pub use crate::url::resolve;
