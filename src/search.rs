//! Single-word search ordered by link authority

use crate::config::RankConfig;
use crate::index::{normalize_word, SearchIndex};
use crate::{DocId, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A search result resolved against the document table
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub url: String,
    pub title: String,
    pub score: f64,
}

/// Answers queries against a shared index
pub struct QueryEngine {
    index: Arc<SearchIndex>,
    rank_config: RankConfig,
}

impl QueryEngine {
    pub fn new(index: Arc<SearchIndex>, rank_config: RankConfig) -> Self {
        Self { index, rank_config }
    }

    /// Returns the documents containing `word`, highest rank first
    ///
    /// `Ok(None)` means the word is not in the index. Ranks are recomputed
    /// only when the link graph changed since they were last computed.
    pub fn search(&self, word: &str) -> Result<Option<Vec<DocId>>> {
        let Some(word) = normalize_word(word) else {
            return Ok(None);
        };
        let Some(word_id) = self.index.word_id(&word) else {
            return Ok(None);
        };
        let Some(doc_ids) = self.index.postings(word_id) else {
            return Ok(None);
        };

        let ranks = self.index.ranks(&self.rank_config)?;
        Ok(Some(order_by_rank(doc_ids, &ranks)))
    }

    /// Like [`search`](Self::search), resolving ids to URLs, titles and scores
    pub fn search_documents(&self, word: &str) -> Result<Option<Vec<SearchHit>>> {
        let Some(doc_ids) = self.search(word)? else {
            return Ok(None);
        };
        let ranks = self.index.ranks(&self.rank_config)?;

        let hits = doc_ids
            .into_iter()
            .filter_map(|doc_id| {
                let doc = self.index.document(doc_id)?;
                Some(SearchHit {
                    doc_id,
                    url: doc.url,
                    title: doc.title,
                    score: ranks.get(&doc_id).copied().unwrap_or(0.0),
                })
            })
            .collect();

        Ok(Some(hits))
    }
}

/// Orders documents by descending rank
///
/// The sort is stable, so equal scores keep their incoming order. Documents
/// without a score sort as zero.
pub fn order_by_rank(mut doc_ids: Vec<DocId>, ranks: &HashMap<DocId, f64>) -> Vec<DocId> {
    let score = |doc_id: &DocId| ranks.get(doc_id).copied().unwrap_or(0.0);
    doc_ids.sort_by(|a, b| score(b).total_cmp(&score(a)));
    doc_ids
}
