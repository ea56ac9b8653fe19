//! Corpus store trait and the in-memory reference implementation.
//!
//! The trait surface is exactly what the retrieval engine needs at query
//! time - listing, counts, nearest-embedding lookup - plus the ingestion
//! operations that populate a corpus. Every embedding is owned by exactly
//! one document and is deleted with it.

use crate::search::types::{DocId, Document, DocumentRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use thiserror::Error;

/// Errors that can occur during corpus store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced document does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error (filesystem, network, database driver)
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend error (lock poisoning, query failure)
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Read/write access to the document corpus.
///
/// Query-time access is read-only: the engine lists candidates, asks for
/// counts, and looks up nearest embeddings. The write operations are the
/// ingestion seam; the engine itself never calls them.
///
/// # Distance contract
///
/// [`nearest_embeddings`](CorpusStore::nearest_embeddings) returns cosine
/// distances in `[0, 2]`, ascending. Whatever metric the backend uses
/// internally, the same metric must apply to indexing and querying.
#[async_trait::async_trait(?Send)]
pub trait CorpusStore {
    // =========================================================================
    // Document Operations
    // =========================================================================

    /// Stores a document, assigning and returning its id.
    async fn add_document(&self, document: Document) -> Result<DocId, StoreError>;

    /// Retrieves a document by id.
    ///
    /// Returns `Ok(None)` if the document doesn't exist.
    async fn get_document(&self, id: DocId) -> Result<Option<DocumentRecord>, StoreError>;

    /// Deletes a document and, with it, its embedding if one exists.
    ///
    /// Returns `Ok(())` even if the document didn't exist.
    async fn delete_document(&self, id: DocId) -> Result<(), StoreError>;

    /// Lists documents, optionally restricted to one category.
    ///
    /// An unknown category yields an empty list, not an error.
    async fn list_documents(&self, category: Option<&str>)
        -> Result<Vec<DocumentRecord>, StoreError>;

    /// Returns the number of documents in the corpus.
    async fn document_count(&self) -> Result<usize, StoreError>;

    /// Returns document counts per category.
    ///
    /// Documents without a category are not counted.
    async fn category_counts(&self) -> Result<BTreeMap<String, usize>, StoreError>;

    // =========================================================================
    // Embedding Operations
    // =========================================================================

    /// Stores the embedding for an existing document.
    ///
    /// Returns [`StoreError::NotFound`] if no document owns `id`; an
    /// embedding never exists without its document.
    async fn put_embedding(&self, id: DocId, embedding: &[f32]) -> Result<(), StoreError>;

    /// Returns the number of documents that have an embedding.
    async fn embedding_count(&self) -> Result<usize, StoreError>;

    /// Returns up to `limit` document ids ordered by ascending cosine
    /// distance from `query`, optionally restricted to one category.
    ///
    /// Documents without an embedding never appear in the result.
    async fn nearest_embeddings(
        &self,
        query: &[f32],
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<(DocId, f32)>, StoreError>;

    // =========================================================================
    // Utility Operations
    // =========================================================================

    /// Clears all documents and embeddings.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Cosine distance between two vectors, in `[0, 2]`.
///
/// Zero-magnitude or length-mismatched inputs map to the maximum distance
/// so they can never outrank a real neighbor.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 2.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 2.0;
    }

    (1.0 - dot / (mag_a * mag_b)).clamp(0.0, 2.0)
}

/// In-memory corpus store.
///
/// Reference implementation used by tests and the CLI. Nearest-embedding
/// lookup is a linear scan; the corpus this engine targets is thousands of
/// documents, well inside brute-force range.
#[derive(Default)]
pub struct InMemoryCorpusStore {
    documents: RwLock<HashMap<u64, DocumentRecord>>,
    embeddings: RwLock<HashMap<u64, Vec<f32>>>,
}

impl InMemoryCorpusStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Backend(format!("Lock poisoned: {}", e))
}

#[async_trait::async_trait(?Send)]
impl CorpusStore for InMemoryCorpusStore {
    async fn add_document(&self, document: Document) -> Result<DocId, StoreError> {
        let id = DocId::new();
        let record = DocumentRecord {
            id,
            title: document.title,
            content: document.content,
            metadata: document.metadata,
        };
        let mut documents = self.documents.write().map_err(lock_err)?;
        documents.insert(id.as_u64(), record);
        Ok(id)
    }

    async fn get_document(&self, id: DocId) -> Result<Option<DocumentRecord>, StoreError> {
        let documents = self.documents.read().map_err(lock_err)?;
        Ok(documents.get(&id.as_u64()).cloned())
    }

    async fn delete_document(&self, id: DocId) -> Result<(), StoreError> {
        let mut documents = self.documents.write().map_err(lock_err)?;
        documents.remove(&id.as_u64());
        // Cascade: an embedding never outlives its document.
        let mut embeddings = self.embeddings.write().map_err(lock_err)?;
        embeddings.remove(&id.as_u64());
        Ok(())
    }

    async fn list_documents(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        let documents = self.documents.read().map_err(lock_err)?;
        let mut records: Vec<DocumentRecord> = documents
            .values()
            .filter(|record| match category {
                Some(wanted) => record.metadata.category.as_deref() == Some(wanted),
                None => true,
            })
            .cloned()
            .collect();
        // Stable listing order keeps downstream scoring reproducible.
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    async fn document_count(&self) -> Result<usize, StoreError> {
        let documents = self.documents.read().map_err(lock_err)?;
        Ok(documents.len())
    }

    async fn category_counts(&self) -> Result<BTreeMap<String, usize>, StoreError> {
        let documents = self.documents.read().map_err(lock_err)?;
        let mut counts = BTreeMap::new();
        for record in documents.values() {
            if let Some(category) = &record.metadata.category {
                *counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn put_embedding(&self, id: DocId, embedding: &[f32]) -> Result<(), StoreError> {
        let documents = self.documents.read().map_err(lock_err)?;
        if !documents.contains_key(&id.as_u64()) {
            return Err(StoreError::NotFound(format!(
                "document {} does not exist",
                id.as_u64()
            )));
        }
        drop(documents);

        let mut embeddings = self.embeddings.write().map_err(lock_err)?;
        embeddings.insert(id.as_u64(), embedding.to_vec());
        Ok(())
    }

    async fn embedding_count(&self) -> Result<usize, StoreError> {
        let embeddings = self.embeddings.read().map_err(lock_err)?;
        Ok(embeddings.len())
    }

    async fn nearest_embeddings(
        &self,
        query: &[f32],
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<(DocId, f32)>, StoreError> {
        let documents = self.documents.read().map_err(lock_err)?;
        let embeddings = self.embeddings.read().map_err(lock_err)?;

        let mut scored: Vec<(DocId, f32)> = embeddings
            .iter()
            .filter(|(id, _)| match category {
                Some(wanted) => documents
                    .get(*id)
                    .and_then(|record| record.metadata.category.as_deref())
                    == Some(wanted),
                None => true,
            })
            .map(|(&id, embedding)| (DocId::from_u64(id), cosine_distance(query, embedding)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut documents = self.documents.write().map_err(lock_err)?;
        documents.clear();
        let mut embeddings = self.embeddings.write().map_err(lock_err)?;
        embeddings.clear();
        Ok(())
    }
}

// Blanket implementation for Arc<T> so one store can back several engines
// (e.g. shared between a test harness and the engine under test).
#[async_trait::async_trait(?Send)]
impl<T: CorpusStore> CorpusStore for std::sync::Arc<T> {
    async fn add_document(&self, document: Document) -> Result<DocId, StoreError> {
        (**self).add_document(document).await
    }

    async fn get_document(&self, id: DocId) -> Result<Option<DocumentRecord>, StoreError> {
        (**self).get_document(id).await
    }

    async fn delete_document(&self, id: DocId) -> Result<(), StoreError> {
        (**self).delete_document(id).await
    }

    async fn list_documents(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        (**self).list_documents(category).await
    }

    async fn document_count(&self) -> Result<usize, StoreError> {
        (**self).document_count().await
    }

    async fn category_counts(&self) -> Result<BTreeMap<String, usize>, StoreError> {
        (**self).category_counts().await
    }

    async fn put_embedding(&self, id: DocId, embedding: &[f32]) -> Result<(), StoreError> {
        (**self).put_embedding(id, embedding).await
    }

    async fn embedding_count(&self) -> Result<usize, StoreError> {
        (**self).embedding_count().await
    }

    async fn nearest_embeddings(
        &self,
        query: &[f32],
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<(DocId, f32)>, StoreError> {
        (**self).nearest_embeddings(query, limit, category).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        (**self).clear().await
    }
}
