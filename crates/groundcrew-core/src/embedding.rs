//! External embedding provider trait.
//!
//! The engine never generates embeddings itself; an opaque external service
//! maps text to fixed-length vectors. This trait is the seam that lets the
//! real provider, test doubles, and a deliberately-failing stand-in be
//! swapped without changing the engine.
//!
//! # Failure contract
//!
//! Implementations report failures through [`EmbedError`]; callers inside
//! this crate treat every failure as a degradation signal (vector scoring
//! skipped for that query), never as a reason to fail the search.

use crate::error::EmbedError;
use async_trait::async_trait;

/// Maps text to a fixed-length dense vector.
///
/// # Consistency
///
/// The provider must be deterministic enough that a document indexed
/// yesterday and a query embedded today live in the same vector space;
/// beyond that the engine treats it as opaque.
///
/// # Examples
///
/// ```ignore
/// struct OpenAiEmbedder { client: Client, model: String }
///
/// #[async_trait(?Send)]
/// impl Embedder for OpenAiEmbedder {
///     fn embedding_dim(&self) -> usize {
///         1536
///     }
///
///     async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
///         self.client
///             .embed(&self.model, text)
///             .await
///             .map_err(|e| EmbedError::Provider(e.to_string()))
///     }
/// }
/// ```
#[async_trait(?Send)]
pub trait Embedder: Send + Sync {
    /// Returns the vector length this provider produces.
    ///
    /// Must match the dimension the corpus was indexed with.
    fn embedding_dim(&self) -> usize;

    /// Produces an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}
