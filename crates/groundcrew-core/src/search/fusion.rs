//! Rank fusion: min-max normalization + weighted sum.
//!
//! Both score lists are normalized onto `[0, 1]` independently, combined
//! with configurable weights, and re-ranked. A document found by only one
//! scorer stays in the running with a zero contribution from the other -
//! it is neither excluded nor boosted.
//!
//! Ordering is fully deterministic: descending combined score, ties broken
//! by ascending document id, so repeated queries over a fixed corpus
//! reproduce byte-identical rankings.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use super::types::DocId;

/// Sort key: higher score wins, then lower id.
type RankKey = (OrderedFloat<f32>, Reverse<u64>);

fn rank_key(doc_id: DocId, score: f32) -> RankKey {
    (OrderedFloat(score), Reverse(doc_id.as_u64()))
}

/// Accumulates one normalized score list into the combined map.
///
/// Min-max scaling; when every score in the list is identical the whole
/// list maps to 1.0 - uniform relevance is not penalized and no division
/// by zero occurs.
fn accumulate_normalized(
    scores: &mut HashMap<DocId, f32>,
    list: &[(DocId, f32)],
    weight: f32,
) {
    let Some((min, max)) = min_max(list) else {
        return;
    };
    let range = max - min;

    for &(doc_id, score) in list {
        let normalized = if range < f32::EPSILON {
            1.0
        } else {
            (score - min) / range
        };
        *scores.entry(doc_id).or_insert(0.0) += weight * normalized;
    }
}

/// Single-pass min/max over a score list.
fn min_max(list: &[(DocId, f32)]) -> Option<(f32, f32)> {
    if list.is_empty() {
        return None;
    }
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &(_, score) in list {
        if score < min {
            min = score;
        }
        if score > max {
            max = score;
        }
    }
    Some((min, max))
}

/// Fuses a lexical and a vector score list into the ranked top-`k`.
///
/// Raw scores may be unbounded; the output is bounded by the weights
/// (`lexical_weight + vector_weight` for a document both scorers found).
/// Either list may be empty, in which case the other one carries the
/// ranking alone.
pub fn fuse(
    lexical: &[(DocId, f32)],
    vector: &[(DocId, f32)],
    lexical_weight: f32,
    vector_weight: f32,
    k: usize,
) -> Vec<(DocId, f32)> {
    let mut scores: HashMap<DocId, f32> =
        HashMap::with_capacity(lexical.len() + vector.len());
    accumulate_normalized(&mut scores, lexical, lexical_weight);
    accumulate_normalized(&mut scores, vector, vector_weight);

    // Partial sort: O(n log k) via min-heap of size k.
    let mut heap: BinaryHeap<Reverse<RankKey>> = BinaryHeap::with_capacity(k + 1);
    for (doc_id, score) in scores {
        heap.push(Reverse(rank_key(doc_id, score)));
        if heap.len() > k {
            heap.pop();
        }
    }

    let mut ranked: Vec<(DocId, f32)> = heap
        .into_iter()
        .map(|Reverse((score, Reverse(id)))| (DocId::from_u64(id), score.0))
        .collect();
    ranked.sort_unstable_by(|a, b| rank_key(b.0, b.1).cmp(&rank_key(a.0, a.1)));
    ranked
}
