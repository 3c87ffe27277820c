//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{DocumentRecord, LinkRecord, RunRecord, RunStatus};
use crate::{DocId, TrawlError, WordId};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(TrawlError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, TrawlError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database, used by tests and one-shot crawls
    pub fn new_in_memory() -> Result<Self, TrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        pages_indexed: row.get::<_, i64>(5)? as u64,
    })
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
    Ok(DocumentRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        discovered_at: row.get(3)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, pages_indexed
                 FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, pages_indexed
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_indexed: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_indexed = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, pages_indexed as i64, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Documents =====

    fn insert_or_get_document(&mut self, url: &str) -> StorageResult<DocId> {
        let existing: Option<DocId> = self
            .conn
            .query_row(
                "SELECT id FROM documents WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (url, discovered_at) VALUES (?1, ?2)",
            params![url, now],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_document(&self, doc_id: DocId) -> StorageResult<DocumentRecord> {
        self.conn
            .query_row(
                "SELECT id, url, title, discovered_at FROM documents WHERE id = ?1",
                params![doc_id],
                document_from_row,
            )
            .optional()?
            .ok_or(StorageError::DocumentNotFound(doc_id))
    }

    fn load_documents(&self) -> StorageResult<Vec<DocumentRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, url, title, discovered_at FROM documents ORDER BY id")?;

        let documents = stmt
            .query_map([], document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(documents)
    }

    // ===== Lexicon =====

    fn insert_or_get_word(&mut self, word: &str) -> StorageResult<WordId> {
        let existing: Option<WordId> = self
            .conn
            .query_row(
                "SELECT id FROM words WHERE word = ?1",
                params![word],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        self.conn
            .execute("INSERT INTO words (word) VALUES (?1)", params![word])?;

        Ok(self.conn.last_insert_rowid())
    }

    fn load_words(&self) -> StorageResult<Vec<(String, WordId)>> {
        let mut stmt = self.conn.prepare("SELECT word, id FROM words ORDER BY id")?;

        let words = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(words)
    }

    // ===== Indexed Pages =====

    fn record_page(
        &mut self,
        doc_id: DocId,
        title: Option<&str>,
        word_ids: &[WordId],
        links: &[(DocId, u32)],
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        if let Some(title) = title {
            tx.execute(
                "UPDATE documents SET title = ?1 WHERE id = ?2",
                params![title, doc_id],
            )?;
        }

        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO postings (word_id, doc_id) VALUES (?1, ?2)")?;
            for word_id in word_ids {
                stmt.execute(params![word_id, doc_id])?;
            }
        }

        tx.execute(
            "DELETE FROM links WHERE from_doc_id = ?1",
            params![doc_id],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO links (from_doc_id, to_doc_id, count) VALUES (?1, ?2, ?3)
                 ON CONFLICT(from_doc_id, to_doc_id) DO UPDATE SET count = count + excluded.count",
            )?;
            for (to_doc_id, count) in links {
                stmt.execute(params![doc_id, to_doc_id, count])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_postings(&self) -> StorageResult<Vec<(WordId, DocId)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT word_id, doc_id FROM postings ORDER BY word_id, doc_id")?;

        let postings = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(postings)
    }

    fn load_links(&self) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_doc_id, to_doc_id, count FROM links ORDER BY from_doc_id, to_doc_id",
        )?;

        let links = stmt
            .query_map([], |row| {
                Ok(LinkRecord {
                    from_doc_id: row.get(0)?,
                    to_doc_id: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    // ===== Ranks =====

    fn replace_ranks(&mut self, ranks: &HashMap<DocId, f64>, graph: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO ranks (doc_id, score) VALUES (?1, ?2)")?;
            for (doc_id, score) in ranks {
                stmt.execute(params![doc_id, score])?;
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('rank_graph', ?1)",
            params![graph],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn load_ranks(&self) -> StorageResult<HashMap<DocId, f64>> {
        let mut stmt = self.conn.prepare("SELECT doc_id, score FROM ranks")?;

        let ranks = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(ranks)
    }

    fn rank_graph(&self) -> StorageResult<Option<String>> {
        let graph = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'rank_graph'", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(graph)
    }

    fn top_ranked(&self, limit: usize) -> StorageResult<Vec<(DocumentRecord, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.id, d.url, d.title, d.discovered_at, r.score
             FROM ranks r JOIN documents d ON d.id = r.doc_id
             ORDER BY r.score DESC, d.id ASC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((document_from_row(row)?, row.get(4)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    // ===== Statistics =====

    fn count_documents(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_titled_documents(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE title != ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_words(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_postings(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM postings", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_ranks(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ranks", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
