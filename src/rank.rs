//! Link authority scoring
//!
//! PageRank by power iteration over the distinct edges of the link graph.
//! Pure computation: no I/O happens here.

use crate::config::RankConfig;
use crate::DocId;
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};

/// Computes a score for every document that appears as an edge endpoint
///
/// Scores start uniform at `1/N`. Each step gives every node the random-jump
/// share `(1 - d) / N` plus `d` times what flows in along its inbound edges;
/// dangling nodes spread their score evenly over all nodes. Iteration stops
/// when the L1 change drops below `tolerance` or after `max_iterations`.
/// The resulting scores sum to 1.
pub fn compute_ranks(
    edges: &BTreeSet<(DocId, DocId)>,
    config: &RankConfig,
) -> HashMap<DocId, f64> {
    let nodes: Vec<DocId> = edges
        .iter()
        .flat_map(|&(from, to)| [from, to])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if nodes.is_empty() {
        return HashMap::new();
    }

    let n = nodes.len();
    let position: HashMap<DocId, usize> =
        nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let mut out_degree = vec![0usize; n];
    let mut inbound: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (from, to) in edges {
        let (from, to) = (position[from], position[to]);
        out_degree[from] += 1;
        inbound[to].push(from);
    }

    let damping = config.damping_factor;
    let uniform = 1.0 / n as f64;
    let mut scores = vec![uniform; n];

    for iteration in 0..config.max_iterations {
        let dangling: f64 = scores
            .iter()
            .zip(&out_degree)
            .filter(|(_, degree)| **degree == 0)
            .map(|(score, _)| score)
            .sum();

        let next: Vec<f64> = (0..n)
            .map(|i| {
                let flow: f64 = inbound[i]
                    .iter()
                    .map(|&j| scores[j] / out_degree[j] as f64)
                    .sum();
                (1.0 - damping) * uniform + damping * (flow + dangling * uniform)
            })
            .collect();

        let delta: f64 = next
            .iter()
            .zip(&scores)
            .map(|(new, old)| (new - old).abs())
            .sum();
        scores = next;

        if delta < config.tolerance {
            tracing::trace!(iteration, delta, "Rank iteration converged");
            break;
        }
    }

    nodes.into_iter().zip(scores).collect()
}

/// Gives every document missing from `ranks` a score of zero
pub fn backfill<I>(mut ranks: HashMap<DocId, f64>, documents: I) -> HashMap<DocId, f64>
where
    I: IntoIterator<Item = DocId>,
{
    for doc_id in documents {
        ranks.entry(doc_id).or_insert(0.0);
    }
    ranks
}

/// Hex SHA-256 over the inputs a rank computation depends on
///
/// Persisted next to the scores so a reopened index can tell whether they
/// still describe the stored graph.
pub fn graph_fingerprint<I>(edges: &BTreeSet<(DocId, DocId)>, documents: I) -> String
where
    I: IntoIterator<Item = DocId>,
{
    let documents: BTreeSet<DocId> = documents.into_iter().collect();

    let mut hasher = Sha256::new();
    hasher.update((documents.len() as u64).to_le_bytes());
    for doc_id in &documents {
        hasher.update(doc_id.to_le_bytes());
    }
    hasher.update((edges.len() as u64).to_le_bytes());
    for (from, to) in edges {
        hasher.update(from.to_le_bytes());
        hasher.update(to.to_le_bytes());
    }
    hex::encode(hasher.finalize())
}
