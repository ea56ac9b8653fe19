//! Corpus storage abstraction.
//!
//! The engine reads documents and embeddings through the [`CorpusStore`]
//! trait so the backing store can be a relational database with a vector
//! extension, a dedicated vector index, or the in-memory implementation
//! used by tests and the CLI. All engine access is read-only; the
//! ingestion-side operations exist so a corpus can be populated at all.

mod corpus_store;

pub use corpus_store::{CorpusStore, InMemoryCorpusStore, StoreError};
