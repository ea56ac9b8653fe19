//! Vector scoring: query embedding + nearest-neighbor lookup.
//!
//! Every failure mode at this layer - provider unreachable, provider slow,
//! wrong-dimension vector, store hiccup after mode selection - degrades to
//! an empty score list with a warning. The mode selector turns that into
//! a lexical-only response; nothing here is allowed to fail a query.

use std::time::Duration;

use tracing::{debug, warn};

use super::types::DocId;
use crate::embedding::Embedder;
use crate::storage::CorpusStore;

/// Converts a cosine distance in `[0, 2]` to a similarity in `[0, 1]`.
///
/// Monotonic in the distance, so ranking is preserved; the clamp absorbs
/// floating-point drift from the store.
fn similarity_from_distance(distance: f32) -> f32 {
    (1.0 - distance / 2.0).clamp(0.0, 1.0)
}

/// Scores up to `limit` documents by embedding similarity to the query.
///
/// Returns `(DocId, similarity)` pairs ordered by descending similarity.
/// The caller is expected to have already established that at least one
/// embedding exists; an empty return here means "no vector signal", for
/// whatever reason, and is not distinguishable from a provider outage by
/// design.
pub async fn score_candidates<S, E>(
    store: &S,
    embedder: &E,
    query: &str,
    limit: usize,
    category: Option<&str>,
    embed_timeout: Duration,
    store_timeout: Duration,
) -> Vec<(DocId, f32)>
where
    S: CorpusStore + ?Sized,
    E: Embedder + ?Sized,
{
    let query_embedding = match tokio::time::timeout(embed_timeout, embedder.embed(query)).await {
        Ok(Ok(embedding)) => embedding,
        Ok(Err(e)) => {
            warn!("Embedding provider failed, degrading to lexical-only: {}", e);
            return Vec::new();
        }
        Err(_) => {
            warn!(
                "Embedding provider exceeded {:?}, degrading to lexical-only",
                embed_timeout
            );
            return Vec::new();
        }
    };

    let expected = embedder.embedding_dim();
    if query_embedding.len() != expected {
        warn!(
            expected,
            actual = query_embedding.len(),
            "Provider returned wrong-dimension embedding, degrading to lexical-only"
        );
        return Vec::new();
    }

    // A store that answered the mode-selection counts but stalls here is a
    // mid-query hiccup, not "corpus unreachable": degrade, don't fail.
    let lookup = store.nearest_embeddings(&query_embedding, limit, category);
    let nearest = match tokio::time::timeout(store_timeout, lookup).await {
        Ok(Ok(nearest)) => nearest,
        Ok(Err(e)) => {
            warn!("Nearest-embedding lookup failed, degrading to lexical-only: {}", e);
            return Vec::new();
        }
        Err(_) => {
            warn!(
                "Nearest-embedding lookup exceeded {:?}, degrading to lexical-only",
                store_timeout
            );
            return Vec::new();
        }
    };

    debug!(candidates = nearest.len(), "Vector scorer produced candidates");

    nearest
        .into_iter()
        .map(|(doc_id, distance)| (doc_id, similarity_from_distance(distance)))
        .collect()
}
