//! Shared search index
//!
//! [`SearchIndex`] owns everything the crawl builds up: the document and word
//! registries, the inverted index, the link graph, the document table and the
//! cached rank scores. It is shared between crawl workers behind an `Arc`.
//!
//! Workers traverse a page locally and then publish the result with
//! [`SearchIndex::index_page`]. Publishing writes the page to the store in one
//! transaction and then updates the in-memory structures while holding all of
//! their write locks, so readers never observe a half-indexed page.

mod inverted;
mod links;
mod registry;
mod tokenizer;

pub use inverted::InvertedIndex;
pub use links::LinkGraph;
pub use registry::{IdRegistry, Keyspace};
pub use tokenizer::{is_stop_word, normalize_word, tokenize};

use crate::config::RankConfig;
use crate::crawler::PageScan;
use crate::rank;
use crate::storage::{SqliteStorage, Storage};
use crate::{DocId, Result, WordId};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A document known to the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub url: String,
    /// Empty until a title element is seen on the page
    pub title: String,
}

/// One word occurrence on a page with the emphasis weight it was seen at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordOccurrence {
    pub word_id: WordId,
    pub weight: i32,
}

/// What publishing a page added to the index
#[derive(Debug, Clone)]
pub struct IndexedPage {
    pub doc_id: DocId,
    pub title: Option<String>,
    /// Every surviving token in document order
    pub occurrences: Vec<WordOccurrence>,
    /// Outgoing edges with multiplicity, sorted by target
    pub outbound: Vec<(DocId, u32)>,
}

struct RankCache {
    generation: u64,
    scores: Arc<HashMap<DocId, f64>>,
}

pub struct SearchIndex {
    storage: Mutex<SqliteStorage>,
    documents: IdRegistry,
    words: IdRegistry,
    inverted: RwLock<InvertedIndex>,
    links: RwLock<LinkGraph>,
    document_table: RwLock<HashMap<DocId, DocumentEntry>>,
    /// Bumped whenever the link graph or the document set changes
    generation: AtomicU64,
    ranks: Mutex<Option<RankCache>>,
}

impl SearchIndex {
    /// Opens (or creates) the database at `path` and loads its contents
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_storage(SqliteStorage::new(path)?)
    }

    /// Creates an empty index backed by an in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::from_storage(SqliteStorage::new_in_memory()?)
    }

    /// Builds the index from whatever the store already holds
    pub fn from_storage(storage: SqliteStorage) -> Result<Self> {
        let documents = IdRegistry::new(Keyspace::Documents);
        let words = IdRegistry::new(Keyspace::Words);

        let records = storage.load_documents()?;
        documents.warm(records.iter().map(|doc| (doc.url.clone(), doc.id)));
        let document_table: HashMap<DocId, DocumentEntry> = records
            .into_iter()
            .map(|doc| {
                (
                    doc.id,
                    DocumentEntry {
                        url: doc.url,
                        title: doc.title,
                    },
                )
            })
            .collect();

        words.warm(storage.load_words()?);
        let inverted: InvertedIndex = storage.load_postings()?.into_iter().collect();
        let links: LinkGraph = storage.load_links()?.into_iter().collect();

        // Stored ranks are only current if they were computed from this graph
        let graph = rank::graph_fingerprint(&links.edges(), document_table.keys().copied());
        let ranks = if storage.rank_graph()?.as_deref() == Some(graph.as_str()) {
            Some(RankCache {
                generation: 0,
                scores: Arc::new(storage.load_ranks()?),
            })
        } else {
            None
        };

        tracing::debug!(
            documents = document_table.len(),
            words = words.len(),
            edges = links.edge_count(),
            "Loaded search index"
        );

        Ok(Self {
            storage: Mutex::new(storage),
            documents,
            words,
            inverted: RwLock::new(inverted),
            links: RwLock::new(links),
            document_table: RwLock::new(document_table),
            generation: AtomicU64::new(0),
            ranks: Mutex::new(ranks),
        })
    }

    /// The backing store, for run bookkeeping and statistics
    pub fn storage(&self) -> &Mutex<SqliteStorage> {
        &self.storage
    }

    /// Resolves the document id for a normalized URL, creating one if unseen
    pub fn document_id(&self, url: &str) -> Result<DocId> {
        let doc_id = self.documents.id_for(url, &self.storage)?;

        let mut table = self.document_table.write();
        if !table.contains_key(&doc_id) {
            table.insert(
                doc_id,
                DocumentEntry {
                    url: url.to_string(),
                    title: String::new(),
                },
            );
            self.generation.fetch_add(1, Ordering::AcqRel);
        }

        Ok(doc_id)
    }

    /// Publishes a locally traversed page
    ///
    /// Words and link targets are resolved to ids first (allocating as
    /// needed), then the page is recorded in the store in one transaction and
    /// finally made visible in memory.
    pub fn index_page(&self, doc_id: DocId, page: &PageScan) -> Result<IndexedPage> {
        let mut occurrences = Vec::with_capacity(page.tokens.len());
        let mut word_ids = BTreeSet::new();
        for (word, weight) in &page.tokens {
            let word_id = self.words.id_for(word, &self.storage)?;
            occurrences.push(WordOccurrence {
                word_id,
                weight: *weight,
            });
            word_ids.insert(word_id);
        }

        let mut targets: BTreeMap<DocId, u32> = BTreeMap::new();
        for link in &page.links {
            let to = self.document_id(link)?;
            *targets.entry(to).or_insert(0) += 1;
        }
        let outbound: Vec<(DocId, u32)> = targets.into_iter().collect();
        let word_ids: Vec<WordId> = word_ids.into_iter().collect();

        self.storage
            .lock()
            .record_page(doc_id, page.title.as_deref(), &word_ids, &outbound)?;

        {
            let mut inverted = self.inverted.write();
            let mut links = self.links.write();
            let mut table = self.document_table.write();

            for &word_id in &word_ids {
                inverted.insert(word_id, doc_id);
            }
            links.replace_outgoing(doc_id, &outbound);
            if let (Some(title), Some(entry)) = (&page.title, table.get_mut(&doc_id)) {
                entry.title = title.clone();
            }
            self.generation.fetch_add(1, Ordering::AcqRel);
        }

        tracing::trace!(
            doc_id,
            words = word_ids.len(),
            links = outbound.len(),
            "Published page"
        );

        Ok(IndexedPage {
            doc_id,
            title: page.title.clone(),
            occurrences,
            outbound,
        })
    }

    /// Recomputes link authority over the current graph and persists it
    ///
    /// Every known document gets exactly one score; documents outside the
    /// graph score zero.
    pub fn refresh_ranks(&self, config: &RankConfig) -> Result<Arc<HashMap<DocId, f64>>> {
        let generation = self.generation.load(Ordering::Acquire);
        let edges = self.links.read().edges();
        let doc_ids: Vec<DocId> = self.document_table.read().keys().copied().collect();

        let graph = rank::graph_fingerprint(&edges, doc_ids.iter().copied());
        let scores = rank::backfill(rank::compute_ranks(&edges, config), doc_ids);
        self.storage.lock().replace_ranks(&scores, &graph)?;

        tracing::debug!(
            documents = scores.len(),
            edges = edges.len(),
            generation,
            "Refreshed ranks"
        );

        let scores = Arc::new(scores);
        *self.ranks.lock() = Some(RankCache {
            generation,
            scores: Arc::clone(&scores),
        });
        Ok(scores)
    }

    /// Rank scores for the current graph, recomputed only if it changed
    pub fn ranks(&self, config: &RankConfig) -> Result<Arc<HashMap<DocId, f64>>> {
        let generation = self.generation.load(Ordering::Acquire);
        if let Some(cache) = self.ranks.lock().as_ref() {
            if cache.generation == generation {
                return Ok(Arc::clone(&cache.scores));
            }
        }
        self.refresh_ranks(config)
    }

    /// Looks up the id of an already normalized word
    pub fn word_id(&self, word: &str) -> Option<WordId> {
        self.words.get(word)
    }

    /// Documents containing `word_id`, ascending by id
    pub fn postings(&self, word_id: WordId) -> Option<Vec<DocId>> {
        self.inverted
            .read()
            .postings(word_id)
            .map(|docs| docs.iter().copied().collect())
    }

    pub fn document(&self, doc_id: DocId) -> Option<DocumentEntry> {
        self.document_table.read().get(&doc_id).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.document_table.read().len()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Multiplicity of the link `from -> to`
    pub fn link_count(&self, from: DocId, to: DocId) -> u32 {
        self.links.read().count(from, to)
    }

    /// Distinct link edges
    pub fn edges(&self) -> BTreeSet<(DocId, DocId)> {
        self.links.read().edges()
    }

    /// Snapshot of the inverted index keyed by word id
    pub fn inverted_index(&self) -> BTreeMap<WordId, BTreeSet<DocId>> {
        self.inverted
            .read()
            .iter()
            .map(|(word_id, docs)| (word_id, docs.clone()))
            .collect()
    }

    /// Snapshot of the inverted index with words and URLs in place of ids
    pub fn resolved_inverted_index(&self) -> BTreeMap<String, BTreeSet<String>> {
        let words: HashMap<WordId, String> = self
            .words
            .snapshot()
            .into_iter()
            .map(|(word, id)| (id, word))
            .collect();

        let inverted = self.inverted.read();
        let table = self.document_table.read();

        inverted
            .iter()
            .filter_map(|(word_id, docs)| {
                let word = words.get(&word_id)?.clone();
                let urls = docs
                    .iter()
                    .filter_map(|doc_id| table.get(doc_id).map(|doc| doc.url.clone()))
                    .collect();
                Some((word, urls))
            })
            .collect()
    }
}
