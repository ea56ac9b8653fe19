use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::config;

/// Unique document identifier.
///
/// IDs are assigned atomically at ingestion and never reused. Use
/// `DocId::new()` to allocate, and `DocId::init_counter()` after loading an
/// existing corpus so fresh IDs don't collide with stored ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(u64);

/// Global counter for generating unique document IDs.
static DOC_ID_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

impl DocId {
    /// Allocates a new unique document ID.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        use std::sync::atomic::Ordering;
        Self(DOC_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Initializes the ID counter to continue after the given maximum ID.
    ///
    /// Call after loading an existing corpus. Only moves the counter
    /// forward, so repeated loads are safe.
    pub fn init_counter(max_existing_id: u64) {
        use std::sync::atomic::Ordering;
        let next_id = max_existing_id.saturating_add(1);
        DOC_ID_COUNTER.fetch_max(next_id, Ordering::SeqCst);
    }

    /// Creates a DocId from a raw u64 value.
    pub fn from_u64(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw u64 value of this ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// A unit of indexed content before ingestion assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Human-readable label
    pub title: String,
    /// Full text body
    pub content: String,
    /// Provenance and filtering metadata (never used for scoring)
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

/// Document metadata.
///
/// The known fields are what filtering and provenance need; anything else
/// the ingestion pipeline attaches survives round-trips through the
/// flattened `extra` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Category used for filtering and per-category counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Source file or URL this document was ingested from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Position of this chunk within its source (0-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    /// Total number of chunks from the same source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
    /// Forward-compatible escape hatch for fields this engine doesn't know
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Stored document record with its assigned ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique document identifier
    pub id: DocId,
    /// Human-readable label
    pub title: String,
    /// Full text body
    pub content: String,
    /// Provenance and filtering metadata
    pub metadata: DocumentMetadata,
}

/// Which scoring signals actually produced the response.
///
/// Recomputed from corpus state on every query; never cached between
/// queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Lexical and vector signals were fused
    Hybrid,
    /// Only the lexical signal was used
    Bm25Only,
    /// The corpus is empty; nothing to rank
    NoData,
}

impl SearchMode {
    /// Wire name of the mode, matching its serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Hybrid => "hybrid",
            SearchMode::Bm25Only => "bm25_only",
            SearchMode::NoData => "no_data",
        }
    }
}

fn default_k() -> usize {
    config::DEFAULT_RESULTS
}

/// A search query as received from the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query; must be non-empty after trimming
    pub query: String,
    /// Requested result count, 1-20
    #[serde(default = "default_k")]
    pub k: usize,
    /// Optional category filter; unknown categories yield zero candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SearchRequest {
    /// Builds a request with the default result count and no filter.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            k: config::DEFAULT_RESULTS,
            category: None,
        }
    }
}

/// One ranked result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document identifier
    pub doc_id: DocId,
    /// Document title
    pub title: String,
    /// Truncated content with an ellipsis marker when shortened
    pub snippet: String,
    /// Fused relevance score in [0, 1]
    pub score: f32,
    /// Source the document was ingested from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Document category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Position of this chunk within its source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    /// Total chunks from the same source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<usize>,
}

/// The complete answer to one search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Scoring signals actually used for this response
    pub mode: SearchMode,
    /// Whether the vector signal contributed to the ranking
    pub embeddings_available: bool,
    /// Ranked results, at most `k` of them
    pub results: Vec<SearchHit>,
    /// Number of documents in the whole corpus
    pub total_documents: usize,
    /// Document counts per category over the whole corpus
    pub category_counts: BTreeMap<String, usize>,
}

/// Corpus summary for status surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    /// Number of documents in the corpus
    pub total_documents: usize,
    /// Number of documents with a stored embedding
    pub embedded_documents: usize,
    /// Document counts per category
    pub category_counts: BTreeMap<String, usize>,
}

/// Error types for search operations.
///
/// Degradations (embedder down, empty embedding table, zero-signal query)
/// are deliberately absent: they surface through [`SearchMode`] and
/// [`SearchResponse::embeddings_available`], not as errors.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Caller input rejected before scoring
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// Corpus store unreachable; distinct from "no results found"
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<crate::storage::StoreError> for SearchError {
    fn from(e: crate::storage::StoreError) -> Self {
        SearchError::Storage(e.to_string())
    }
}
