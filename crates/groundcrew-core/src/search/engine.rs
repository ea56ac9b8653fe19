//! Retrieval engine: mode selection, scorer orchestration, response
//! assembly.
//!
//! One call to [`RetrievalEngine::search`] is one logical unit of work:
//! validate the request, read corpus state, pick a mode, run the
//! applicable scorers concurrently, fuse, and shape the response. Nothing
//! is cached between queries and nothing is mutated, so concurrent and
//! abandoned queries need no coordination.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::fusion;
use super::lexical;
use super::snippet::make_snippet;
use super::types::{
    CorpusStats, DocId, DocumentRecord, SearchError, SearchHit, SearchMode, SearchRequest,
    SearchResponse,
};
use super::vector;
use crate::config;
use crate::embedding::Embedder;
use crate::storage::CorpusStore;

/// Tunable engine parameters.
///
/// The defaults mirror [`crate::config`]; the fusion weights and the
/// oversampling factor are deliberately configuration rather than
/// constants - only the shape of the algorithm is contractual.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Weight of the normalized lexical score in the fused ranking
    pub lexical_weight: f32,
    /// Weight of the normalized vector score in the fused ranking
    pub vector_weight: f32,
    /// The vector scorer fetches `oversample_factor * k` candidates
    pub oversample_factor: usize,
    /// Maximum snippet length in characters
    pub snippet_max_chars: usize,
    /// Deadline for one embedding provider call
    pub embed_timeout: Duration,
    /// Deadline for corpus store reads
    pub store_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lexical_weight: config::DEFAULT_LEXICAL_WEIGHT,
            vector_weight: config::DEFAULT_VECTOR_WEIGHT,
            oversample_factor: config::DEFAULT_OVERSAMPLE_FACTOR,
            snippet_max_chars: config::SNIPPET_MAX_CHARS,
            embed_timeout: config::EMBED_TIMEOUT,
            store_timeout: config::STORE_TIMEOUT,
        }
    }
}

/// Hybrid retrieval engine over a corpus store and an embedding provider.
///
/// # Modes
///
/// Every query re-derives the mode from corpus counts:
///
/// - corpus empty → [`SearchMode::NoData`], empty results
/// - no embeddings stored → [`SearchMode::Bm25Only`], the provider is
///   never called
/// - otherwise → [`SearchMode::Hybrid`], both scorers run concurrently
///
/// A hybrid query whose vector signal comes back empty (provider down,
/// timed out, wrong dimension) reports `bm25_only` with
/// `embeddings_available = false`: the response describes what was
/// actually used, so callers can adjust their grounding policy.
pub struct RetrievalEngine<S: CorpusStore, E: Embedder> {
    store: S,
    embedder: E,
    config: EngineConfig,
}

impl<S: CorpusStore, E: Embedder> RetrievalEngine<S, E> {
    /// Creates an engine with the default configuration.
    pub fn new(store: S, embedder: E) -> Self {
        Self::with_config(store, embedder, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(store: S, embedder: E, config: EngineConfig) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Returns a reference to the corpus store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Executes one search request.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for an empty query or an
    /// out-of-bounds `k`, and [`SearchError::Storage`] when the corpus
    /// store is unreachable. Scorer degradations are not errors; they
    /// surface through the response flags.
    #[must_use = "Search results should be used or errors handled"]
    #[instrument(skip_all, fields(k = request.k, category = ?request.category))]
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery(
                "Query text cannot be empty".to_string(),
            ));
        }
        if !(config::MIN_RESULTS..=config::MAX_RESULTS).contains(&request.k) {
            return Err(SearchError::InvalidQuery(format!(
                "Result count must be between {} and {}, got {}",
                config::MIN_RESULTS,
                config::MAX_RESULTS,
                request.k
            )));
        }

        // Corpus state drives mode selection; the store being unreachable
        // here is the one fatal failure in the pipeline.
        let total_documents = self.store_read(self.store.document_count()).await?;
        let embedding_count = self.store_read(self.store.embedding_count()).await?;
        let category_counts = self.store_read(self.store.category_counts()).await?;

        if total_documents == 0 {
            debug!("Corpus is empty, returning no_data response");
            return Ok(SearchResponse {
                mode: SearchMode::NoData,
                embeddings_available: false,
                results: Vec::new(),
                total_documents,
                category_counts,
            });
        }

        let category = request.category.as_deref();
        let candidates = self
            .store_read(self.store.list_documents(category))
            .await?;

        let mode = if embedding_count == 0 {
            SearchMode::Bm25Only
        } else {
            SearchMode::Hybrid
        };

        if candidates.is_empty() {
            // Category filtered everything out; well-formed empty response.
            debug!(?category, "No candidates after category filter");
            return Ok(SearchResponse {
                mode,
                embeddings_available: embedding_count > 0,
                results: Vec::new(),
                total_documents,
                category_counts,
            });
        }

        // The scorers are independent: lexical is pure CPU over the
        // already-fetched candidates, vector suspends on the provider and
        // the store. Join them so the lexical pass overlaps the wait.
        let lexical_input: Vec<(DocId, &str)> = candidates
            .iter()
            .map(|record| (record.id, record.content.as_str()))
            .collect();
        let lexical_future = async { lexical::score_candidates(query, &lexical_input) };
        let vector_future = async {
            match mode {
                SearchMode::Hybrid => {
                    vector::score_candidates(
                        &self.store,
                        &self.embedder,
                        query,
                        request.k * self.config.oversample_factor,
                        category,
                        self.config.embed_timeout,
                        self.config.store_timeout,
                    )
                    .await
                }
                // No embeddings stored: skip the scorer entirely so no
                // provider call is wasted.
                _ => Vec::new(),
            }
        };
        let (lexical_scores, vector_scores) = futures::join!(lexical_future, vector_future);

        debug!(
            lexical = lexical_scores.len(),
            vector = vector_scores.len(),
            "Scorers completed"
        );

        // Degradation transparency: report what was actually used.
        let embeddings_available = !vector_scores.is_empty();
        let mode = match mode {
            SearchMode::Hybrid if !embeddings_available => {
                info!("Vector signal unavailable, response degrades to bm25_only");
                SearchMode::Bm25Only
            }
            other => other,
        };

        let fused = fusion::fuse(
            &lexical_scores,
            &vector_scores,
            self.config.lexical_weight,
            self.config.vector_weight,
            request.k,
        );

        let by_id: HashMap<DocId, &DocumentRecord> = candidates
            .iter()
            .map(|record| (record.id, record))
            .collect();

        let mut results = Vec::with_capacity(fused.len());
        for (doc_id, score) in fused {
            match by_id.get(&doc_id) {
                Some(record) => results.push(self.to_hit(record, score)),
                // Scored but no longer listed; deleted mid-query. Skip.
                None => warn!(doc_id = doc_id.as_u64(), "Scored document missing from candidate set"),
            }
        }

        info!(
            mode = mode.as_str(),
            results = results.len(),
            "Search completed"
        );

        Ok(SearchResponse {
            mode,
            embeddings_available,
            results,
            total_documents,
            category_counts,
        })
    }

    /// Returns corpus counts for status surfaces.
    pub async fn stats(&self) -> Result<CorpusStats, SearchError> {
        Ok(CorpusStats {
            total_documents: self.store_read(self.store.document_count()).await?,
            embedded_documents: self.store_read(self.store.embedding_count()).await?,
            category_counts: self.store_read(self.store.category_counts()).await?,
        })
    }

    /// Runs a store read under the configured deadline.
    ///
    /// Store timeouts and errors are both fatal: without corpus data there
    /// is nothing to rank, which must stay distinct from "no results".
    async fn store_read<T>(
        &self,
        operation: impl Future<Output = Result<T, crate::storage::StoreError>>,
    ) -> Result<T, SearchError> {
        match tokio::time::timeout(self.config.store_timeout, operation).await {
            Ok(result) => result.map_err(SearchError::from),
            Err(_) => Err(SearchError::Storage(format!(
                "Corpus store did not respond within {:?}",
                self.config.store_timeout
            ))),
        }
    }

    fn to_hit(&self, record: &DocumentRecord, score: f32) -> SearchHit {
        SearchHit {
            doc_id: record.id,
            title: record.title.clone(),
            snippet: make_snippet(&record.content, self.config.snippet_max_chars),
            // Weights are caller-configurable; the [0, 1] contract on the
            // wire holds regardless of what they sum to.
            score: score.clamp(0.0, 1.0),
            source: record.metadata.source.clone(),
            category: record.metadata.category.clone(),
            chunk_index: record.metadata.chunk_index,
            total_chunks: record.metadata.chunk_count,
        }
    }
}
