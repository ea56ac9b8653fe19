//! Hybrid search: lexical + vector scoring with rank fusion.
//!
//! # Architecture
//!
//! - `types`: Request/response types, `DocId`, `SearchMode`, `SearchError`
//! - `lexical`: Okapi BM25 recomputed per query over the candidate set
//! - `vector`: Embedding similarity via the external provider
//! - `fusion`: Min-max normalization + weighted-sum rank fusion
//! - `engine`: `RetrievalEngine` orchestrating mode selection and scoring
//! - `snippet`: Bounded-length content truncation for hits
//!
//! # Algorithm
//!
//! Both scorers run over the same category-filtered candidate set and
//! return raw, unbounded scores. Fusion min-max normalizes each list onto
//! `[0, 1]` independently, combines them with configurable weights
//! (defaults 0.5/0.5), sorts descending with ties broken by ascending
//! document id, and truncates to the requested count. Raw scores never
//! reach the caller.

pub mod types;

// Internal modules - exposed for tests and benchmarking but hidden from docs
mod engine;
#[doc(hidden)]
pub mod fusion;
#[doc(hidden)]
pub mod lexical;
#[doc(hidden)]
pub mod snippet;
#[doc(hidden)]
pub mod vector;

// Re-export main types (public API)
pub use engine::{EngineConfig, RetrievalEngine};
pub use types::{
    CorpusStats, DocId, Document, DocumentMetadata, DocumentRecord, SearchError, SearchHit,
    SearchMode, SearchRequest, SearchResponse,
};
