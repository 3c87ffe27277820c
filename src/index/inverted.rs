//! In-memory inverted index
//!
//! Maps each word id to the set of documents it occurs in. Membership only:
//! repeated occurrences in one document collapse to a single entry.

use crate::{DocId, WordId};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    entries: HashMap<WordId, BTreeSet<DocId>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `word_id` occurs in `doc_id`; returns false if already known
    pub fn insert(&mut self, word_id: WordId, doc_id: DocId) -> bool {
        self.entries.entry(word_id).or_default().insert(doc_id)
    }

    /// Documents containing `word_id`, in ascending id order
    pub fn postings(&self, word_id: WordId) -> Option<&BTreeSet<DocId>> {
        self.entries.get(&word_id)
    }

    pub fn contains(&self, word_id: WordId) -> bool {
        self.entries.contains_key(&word_id)
    }

    /// Number of distinct words with at least one posting
    pub fn word_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of (word, document) memberships
    pub fn posting_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, &BTreeSet<DocId>)> {
        self.entries.iter().map(|(word_id, docs)| (*word_id, docs))
    }
}

impl FromIterator<(WordId, DocId)> for InvertedIndex {
    fn from_iter<T: IntoIterator<Item = (WordId, DocId)>>(iter: T) -> Self {
        let mut index = Self::new();
        for (word_id, doc_id) in iter {
            index.insert(word_id, doc_id);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_collapses_duplicates() {
        let mut index = InvertedIndex::new();

        assert!(index.insert(1, 10));
        assert!(!index.insert(1, 10));
        assert!(index.insert(1, 3));

        let docs: Vec<_> = index.postings(1).unwrap().iter().copied().collect();
        assert_eq!(docs, vec![3, 10]);
        assert_eq!(index.posting_count(), 2);
    }

    #[test]
    fn test_unknown_word() {
        let index = InvertedIndex::new();
        assert!(index.postings(7).is_none());
        assert!(!index.contains(7));
    }

    #[test]
    fn test_from_pairs() {
        let index: InvertedIndex = vec![(1, 1), (2, 1), (1, 2), (1, 1)].into_iter().collect();

        assert_eq!(index.word_count(), 2);
        assert_eq!(index.posting_count(), 3);
    }
}
