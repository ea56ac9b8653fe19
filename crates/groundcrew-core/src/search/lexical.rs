//! Lexical scoring: Okapi BM25 recomputed per query.
//!
//! The scorer is a pure function from (query, candidate set) to scores.
//! Corpus statistics - document frequency and average length - are derived
//! from the candidates of the current query, never cached, so the scorer
//! stays correct under a changing corpus without invalidation machinery.
//!
//! Cost: one tokenization pass over every candidate per query. For the
//! corpus sizes this engine targets (thousands of documents) that is a
//! deliberate trade against index-maintenance complexity.

use std::collections::HashMap;

use super::types::DocId;
use crate::config;

/// Tokenized text: owns the lowercased buffer, exposes `&str` slices via
/// byte spans. One heap allocation per text instead of one per token.
pub(crate) struct Tokens {
    buffer: String,
    spans: Vec<(u32, u32)>,
}

impl Tokens {
    /// Iterates over the token slices.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans
            .iter()
            .map(|&(s, e)| &self.buffer[s as usize..e as usize])
    }

    pub(crate) fn len(&self) -> usize {
        self.spans.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Tokenizes text: lowercase, split on non-alphanumeric boundaries.
///
/// No stemming and no stop-word removal; the scoring contract is pure term
/// overlap.
pub(crate) fn tokenize(text: &str) -> Tokens {
    let buffer = text.to_lowercase();
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in buffer.char_indices() {
        if c.is_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            spans.push((s as u32, i as u32));
        }
    }
    if let Some(s) = start {
        spans.push((s as u32, buffer.len() as u32));
    }

    Tokens { buffer, spans }
}

/// Scores every candidate with lexical overlap against the query.
///
/// Returns `(DocId, raw BM25 score)` pairs sorted by descending score
/// (ties by ascending id), containing only documents with positive score.
/// Candidates whose content tokenizes to nothing are silently excluded; a
/// query that tokenizes to nothing yields an empty list. Neither case is
/// an error - "no lexical signal" is a valid outcome the fusion stage
/// already handles.
pub fn score_candidates(query: &str, candidates: &[(DocId, &str)]) -> Vec<(DocId, f32)> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || candidates.is_empty() {
        return Vec::new();
    }

    // Unique query terms, first occurrence order.
    let mut terms: Vec<&str> = Vec::new();
    for token in query_tokens.iter() {
        if !terms.contains(&token) {
            terms.push(token);
        }
    }

    // One tokenization pass: per-candidate term frequencies for the query
    // terms plus the statistics BM25 needs (doc length, df, avgdl).
    struct CandidateStats {
        doc_id: DocId,
        length: f32,
        term_frequencies: Vec<f32>,
    }

    let mut stats: Vec<CandidateStats> = Vec::with_capacity(candidates.len());
    let mut document_frequency = vec![0u32; terms.len()];
    let mut total_length: u64 = 0;

    for &(doc_id, content) in candidates {
        let tokens = tokenize(content);
        if tokens.is_empty() {
            continue;
        }

        let mut counts: HashMap<&str, f32> = HashMap::new();
        for token in tokens.iter() {
            *counts.entry(token).or_insert(0.0) += 1.0;
        }

        let term_frequencies: Vec<f32> = terms
            .iter()
            .map(|term| counts.get(term).copied().unwrap_or(0.0))
            .collect();
        for (i, &tf) in term_frequencies.iter().enumerate() {
            if tf > 0.0 {
                document_frequency[i] += 1;
            }
        }

        total_length += tokens.len() as u64;
        stats.push(CandidateStats {
            doc_id,
            length: tokens.len() as f32,
            term_frequencies,
        });
    }

    if stats.is_empty() {
        return Vec::new();
    }

    let n = stats.len() as f32;
    let avgdl = total_length as f32 / n;
    let (k1, b) = (config::BM25_K1, config::BM25_B);

    // IDF per query term: log((N - df + 0.5) / (df + 0.5) + 1), the
    // non-negative Okapi variant.
    let idf: Vec<f32> = document_frequency
        .iter()
        .map(|&df| {
            let df = df as f32;
            ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
        })
        .collect();

    let mut scored: Vec<(DocId, f32)> = stats
        .iter()
        .filter_map(|candidate| {
            let mut score = 0.0;
            for (i, &tf) in candidate.term_frequencies.iter().enumerate() {
                if tf > 0.0 {
                    let tf_norm =
                        (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * candidate.length / avgdl));
                    score += idf[i] * tf_norm;
                }
            }
            (score > 0.0).then_some((candidate.doc_id, score))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    scored
}
