//! Directed link graph between documents
//!
//! Edges carry the number of times the link appeared on the source page.
//! Re-indexing a page replaces its outgoing edges as a whole.

use crate::storage::LinkRecord;
use crate::DocId;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    outgoing: HashMap<DocId, BTreeMap<DocId, u32>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every outgoing edge of `from` with `edges`
    pub fn replace_outgoing(&mut self, from: DocId, edges: &[(DocId, u32)]) {
        if edges.is_empty() {
            self.outgoing.remove(&from);
            return;
        }

        let targets = self.outgoing.entry(from).or_default();
        targets.clear();
        for &(to, count) in edges {
            *targets.entry(to).or_insert(0) += count;
        }
    }

    /// Multiplicity of the edge `from -> to`, zero when absent
    pub fn count(&self, from: DocId, to: DocId) -> u32 {
        self.outgoing
            .get(&from)
            .and_then(|targets| targets.get(&to))
            .copied()
            .unwrap_or(0)
    }

    /// Distinct edges, ignoring multiplicity
    pub fn edges(&self) -> BTreeSet<(DocId, DocId)> {
        self.outgoing
            .iter()
            .flat_map(|(&from, targets)| targets.keys().map(move |&to| (from, to)))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }
}

impl FromIterator<LinkRecord> for LinkGraph {
    fn from_iter<T: IntoIterator<Item = LinkRecord>>(iter: T) -> Self {
        let mut graph = Self::new();
        for link in iter {
            *graph
                .outgoing
                .entry(link.from_doc_id)
                .or_default()
                .entry(link.to_doc_id)
                .or_insert(0) += link.count;
        }
        graph
    }
}
