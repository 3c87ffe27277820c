//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Trawl database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_indexed INTEGER NOT NULL DEFAULT 0
);

-- Document table: one row per normalized URL, ids assigned on first sight
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL DEFAULT '',
    discovered_at TEXT NOT NULL
);

-- Lexicon: one row per normalized word token
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL UNIQUE
);

-- Inverted index membership (word occurs in document)
CREATE TABLE IF NOT EXISTS postings (
    word_id INTEGER NOT NULL REFERENCES words(id),
    doc_id INTEGER NOT NULL REFERENCES documents(id),
    PRIMARY KEY (word_id, doc_id)
);

CREATE INDEX IF NOT EXISTS idx_postings_doc ON postings(doc_id);

-- Link graph with edge multiplicity
CREATE TABLE IF NOT EXISTS links (
    from_doc_id INTEGER NOT NULL REFERENCES documents(id),
    to_doc_id INTEGER NOT NULL REFERENCES documents(id),
    count INTEGER NOT NULL DEFAULT 1,
    PRIMARY KEY (from_doc_id, to_doc_id)
);

CREATE INDEX IF NOT EXISTS idx_links_to ON links(to_doc_id);

-- Link authority per document
CREATE TABLE IF NOT EXISTS ranks (
    doc_id INTEGER PRIMARY KEY REFERENCES documents(id),
    score REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ranks_score ON ranks(score);

-- Index-wide values, e.g. the graph fingerprint the stored ranks belong to
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
