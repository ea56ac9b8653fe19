//! Shared test fixtures.
//!
//! Embedder doubles used across the unit-test suites. Only compiled when
//! running tests.

use std::collections::HashMap;

use crate::embedding::Embedder;
use crate::error::EmbedError;

/// Embedder returning canned vectors keyed by exact input text.
///
/// Unknown inputs are a provider error, which keeps tests honest about
/// which texts they expect to embed.
pub struct StaticEmbedder {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl StaticEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: HashMap::new(),
        }
    }

    /// Registers the vector to return for `text`.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

#[async_trait::async_trait(?Send)]
impl Embedder for StaticEmbedder {
    fn embedding_dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| EmbedError::Provider(format!("no canned vector for {:?}", text)))
    }
}

/// Embedder that always fails, simulating an unreachable provider.
pub struct FailingEmbedder {
    dim: usize,
}

impl FailingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

#[async_trait::async_trait(?Send)]
impl Embedder for FailingEmbedder {
    fn embedding_dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
        Err(EmbedError::Provider("connection refused".to_string()))
    }
}
