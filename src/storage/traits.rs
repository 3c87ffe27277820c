//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{DocumentRecord, LinkRecord, RunRecord, RunStatus};
use crate::{DocId, WordId};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocId),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The store is the source of truth for identifiers: documents and words get
/// their ids here, on first insertion, and keep them for the lifetime of the
/// database. Every write is idempotent so a page can be indexed again without
/// duplicating anything.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Records the final status of a run with a finish timestamp
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_indexed: u64,
    ) -> StorageResult<()>;

    // ===== Documents =====

    /// Inserts a document URL or gets the existing document ID
    ///
    /// # Arguments
    ///
    /// * `url` - The normalized URL
    ///
    /// # Returns
    ///
    /// The document ID (either newly created or existing)
    fn insert_or_get_document(&mut self, url: &str) -> StorageResult<DocId>;

    /// Gets a document by ID
    fn get_document(&self, doc_id: DocId) -> StorageResult<DocumentRecord>;

    /// Loads every known document, ordered by ID
    fn load_documents(&self) -> StorageResult<Vec<DocumentRecord>>;

    // ===== Lexicon =====

    /// Inserts a word or gets the existing word ID
    fn insert_or_get_word(&mut self, word: &str) -> StorageResult<WordId>;

    /// Loads the whole lexicon as `(word, id)` pairs
    fn load_words(&self) -> StorageResult<Vec<(String, WordId)>>;

    // ===== Indexed Pages =====

    /// Records everything learned from one fetched page in a single transaction
    ///
    /// # Arguments
    ///
    /// * `doc_id` - The page that was traversed
    /// * `title` - Title found on the page; `None` keeps the stored title
    /// * `word_ids` - Words occurring on the page (membership, duplicates ignored)
    /// * `links` - Outgoing edges with their multiplicity; these replace any
    ///   edges previously recorded for the page
    fn record_page(
        &mut self,
        doc_id: DocId,
        title: Option<&str>,
        word_ids: &[WordId],
        links: &[(DocId, u32)],
    ) -> StorageResult<()>;

    /// Loads the inverted index as `(word id, doc id)` pairs
    fn load_postings(&self) -> StorageResult<Vec<(WordId, DocId)>>;

    /// Loads every link edge
    fn load_links(&self) -> StorageResult<Vec<LinkRecord>>;

    // ===== Ranks =====

    /// Upserts rank scores together with the fingerprint of the graph they
    /// were computed from
    fn replace_ranks(&mut self, ranks: &HashMap<DocId, f64>, graph: &str) -> StorageResult<()>;

    /// Loads all rank scores
    fn load_ranks(&self) -> StorageResult<HashMap<DocId, f64>>;

    /// Fingerprint recorded by the last `replace_ranks`, if any
    fn rank_graph(&self) -> StorageResult<Option<String>>;

    /// Gets the highest ranked documents with their scores
    fn top_ranked(&self, limit: usize) -> StorageResult<Vec<(DocumentRecord, f64)>>;

    // ===== Statistics =====

    /// Gets total document count
    fn count_documents(&self) -> StorageResult<u64>;

    /// Counts documents that have a non-empty title
    fn count_titled_documents(&self) -> StorageResult<u64>;

    /// Gets lexicon size
    fn count_words(&self) -> StorageResult<u64>;

    /// Counts inverted index memberships
    fn count_postings(&self) -> StorageResult<u64>;

    /// Counts distinct link edges
    fn count_links(&self) -> StorageResult<u64>;

    /// Counts documents that have a rank entry
    fn count_ranks(&self) -> StorageResult<u64>;
}
