//! Error types for the embedding provider seam.
//!
//! Provider failures are degradation signals, not fatal errors: the vector
//! scorer logs them and returns an empty candidate list, and the engine
//! surfaces the degradation through the response mode flags.

use thiserror::Error;

/// Errors that can occur while producing a query embedding.
#[derive(Debug, Clone, Error)]
pub enum EmbedError {
    /// The provider rejected the request or was unreachable
    #[error("Embedding provider error: {0}")]
    Provider(String),
    /// The provider did not answer within the configured deadline
    #[error("Embedding provider timed out")]
    Timeout,
    /// The provider returned a vector of the wrong length
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the corpus was indexed with
        expected: usize,
        /// Dimension the provider returned
        actual: usize,
    },
}
