//! Statistics generation from the index database
//!
//! This module provides functionality for extracting and displaying
//! index statistics from the storage layer.

use crate::output::run_duration_seconds;
use crate::storage::{DocumentRecord, RunRecord, Storage};
use crate::TrawlError;
use std::fmt::Write;

/// Index statistics summary
#[derive(Debug, Clone)]
pub struct IndexStatistics {
    /// Every known document, fetched or only linked to
    pub documents: u64,

    /// Documents with a non-empty title
    pub titled_documents: u64,

    /// Lexicon size
    pub words: u64,

    /// Word/document memberships in the inverted index
    pub postings: u64,

    /// Distinct link edges
    pub links: u64,

    /// Documents with a rank score
    pub ranked_documents: u64,

    pub latest_run: Option<RunRecord>,

    /// Highest ranked documents with their scores
    pub top_documents: Vec<(DocumentRecord, f64)>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `top` - How many of the highest ranked documents to include
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(TrawlError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage, top: usize) -> Result<IndexStatistics, TrawlError> {
    Ok(IndexStatistics {
        documents: storage.count_documents()?,
        titled_documents: storage.count_titled_documents()?,
        words: storage.count_words()?,
        postings: storage.count_postings()?,
        links: storage.count_links()?,
        ranked_documents: storage.count_ranks()?,
        latest_run: storage.get_latest_run()?,
        top_documents: storage.top_ranked(top)?,
    })
}

/// Renders statistics as a human readable report
pub fn format_statistics(stats: &IndexStatistics) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "=== Index Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Documents known: {}", stats.documents);
    let _ = writeln!(out, "  Documents with a title: {}", stats.titled_documents);
    let _ = writeln!(out, "  Words in lexicon: {}", stats.words);
    let _ = writeln!(out, "  Index postings: {}", stats.postings);
    let _ = writeln!(out, "  Link edges: {}", stats.links);
    let _ = writeln!(out, "  Ranked documents: {}", stats.ranked_documents);
    let _ = writeln!(out);

    if let Some(run) = &stats.latest_run {
        let _ = writeln!(out, "Latest Run:");
        let _ = writeln!(out, "  Id: {}", run.id);
        let _ = writeln!(out, "  Status: {}", run.status.to_db_string());
        let _ = writeln!(out, "  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            let _ = writeln!(out, "  Finished: {}", finished);
        }
        if let Some(seconds) = run_duration_seconds(run) {
            let _ = writeln!(out, "  Duration: {}s", seconds);
        }
        let _ = writeln!(out, "  Pages indexed: {}", run.pages_indexed);
        let _ = writeln!(out);
    }

    if !stats.top_documents.is_empty() {
        let _ = writeln!(out, "Top Documents by Rank:");
        for (position, (doc, score)) in stats.top_documents.iter().enumerate() {
            let title = if doc.title.is_empty() {
                "(untitled)"
            } else {
                doc.title.as_str()
            };
            let _ = writeln!(
                out,
                "  {:>3}. {:.6}  {}  {}",
                position + 1,
                score,
                doc.url,
                title
            );
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &IndexStatistics) {
    print!("{}", format_statistics(stats));
}
