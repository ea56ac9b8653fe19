//! Corpus file loading.
//!
//! The CLI reads a JSON array of documents into the in-memory store. This
//! is deliberately not an ingestion pipeline - no chunking, no embedding
//! generation - just deserialization of already-prepared records.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use groundcrew_core::embedding::Embedder;
use groundcrew_core::error::EmbedError;
use groundcrew_core::search::{Document, DocumentMetadata};
use groundcrew_core::storage::{CorpusStore, InMemoryCorpusStore};

/// One entry in the corpus file.
#[derive(Deserialize)]
struct CorpusEntry {
    title: String,
    content: String,
    #[serde(default)]
    metadata: DocumentMetadata,
    /// Pre-computed document embedding, if the corpus was indexed with one
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// Loads a corpus JSON file into a fresh in-memory store.
pub async fn load(path: &Path) -> Result<InMemoryCorpusStore> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let entries: Vec<CorpusEntry> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    let store = InMemoryCorpusStore::new();
    for entry in entries {
        let id = store
            .add_document(Document {
                title: entry.title,
                content: entry.content,
                metadata: entry.metadata,
            })
            .await?;
        if let Some(embedding) = entry.embedding {
            store.put_embedding(id, &embedding).await?;
        }
    }

    Ok(store)
}

/// Embedder stand-in for a CLI run without a configured provider.
///
/// The engine only calls it when the corpus carries embeddings; the
/// resulting failure degrades that query to lexical-only scoring, which
/// the output's `mode` field reports.
pub struct UnavailableEmbedder;

#[async_trait::async_trait(?Send)]
impl Embedder for UnavailableEmbedder {
    fn embedding_dim(&self) -> usize {
        groundcrew_core::config::EMBEDDING_DIM
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
        Err(EmbedError::Provider(
            "no embedding provider configured".to_string(),
        ))
    }
}
