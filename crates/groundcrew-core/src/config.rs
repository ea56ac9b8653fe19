//! Production configuration constants.
//!
//! These values define the default behavior of the retrieval engine and are
//! referenced from [`EngineConfig`](crate::search::EngineConfig) and the
//! test suites to keep both consistent.

use std::time::Duration;

// =============================================================================
// Embedding Provider Configuration
// =============================================================================

/// Embedding vector dimension.
///
/// The corpus stores one 1536-dimensional vector per embedded document.
/// Query embeddings with any other length are discarded as a provider
/// fault and the query degrades to lexical-only scoring.
pub const EMBEDDING_DIM: usize = 1536;

/// Upper bound on a single embedding provider call.
///
/// A slow provider is treated the same as an unreachable one: the vector
/// scorer returns no candidates and the query continues on the lexical
/// signal alone.
pub const EMBED_TIMEOUT: Duration = Duration::from_secs(3);

// =============================================================================
// Corpus Store Configuration
// =============================================================================

/// Upper bound on corpus store reads.
///
/// Unlike the embedder, the store is load-bearing: without documents there
/// is nothing to rank, so exceeding this bound fails the query.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Lexical Scoring (Okapi BM25)
// =============================================================================

/// BM25 term-frequency saturation parameter (standard value).
pub const BM25_K1: f32 = 1.2;

/// BM25 document-length normalization parameter (standard value).
pub const BM25_B: f32 = 0.75;

// =============================================================================
// Rank Fusion
// =============================================================================

/// Default weight of the normalized lexical score in the fused ranking.
pub const DEFAULT_LEXICAL_WEIGHT: f32 = 0.5;

/// Default weight of the normalized vector score in the fused ranking.
pub const DEFAULT_VECTOR_WEIGHT: f32 = 0.5;

/// Default oversampling factor for the vector scorer.
///
/// The vector scorer fetches `oversample_factor * k` nearest candidates so
/// fusion has enough one-sided candidates left to re-rank after merging
/// with the lexical list.
pub const DEFAULT_OVERSAMPLE_FACTOR: usize = 2;

// =============================================================================
// Result Shaping
// =============================================================================

/// Minimum accepted result count per query.
pub const MIN_RESULTS: usize = 1;

/// Maximum accepted result count per query.
pub const MAX_RESULTS: usize = 20;

/// Default result count when the caller does not specify one.
pub const DEFAULT_RESULTS: usize = 5;

/// Maximum snippet length in characters, ellipsis excluded.
pub const SNIPPET_MAX_CHARS: usize = 300;
