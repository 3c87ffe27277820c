//! Storage module for persisting the search index
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Document and lexicon id assignment
//! - Inverted index and link graph persistence
//! - Rank scores
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::DocId;

/// Represents a document in the database
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub id: DocId,
    pub url: String,
    /// Empty until a title element is seen on the page
    pub title: String,
    pub discovered_at: String,
}

/// Represents a directed link edge between two documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub from_doc_id: DocId,
    pub to_doc_id: DocId,
    /// Number of times the link was seen on the source page
    pub count: u32,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_indexed: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
