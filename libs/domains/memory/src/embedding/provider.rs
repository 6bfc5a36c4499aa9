use async_trait::async_trait;

use crate::error::MemoryResult;

/// Boundary contract for the external embedding provider.
///
/// Implementations perform one provider round trip per call; results are not
/// cached or deduplicated by text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Produce one embedding vector for `input` using the given model.
    ///
    /// Returns the raw vector; length enforcement against the collection's
    /// dimensionality happens in [`EmbeddingGateway`](super::EmbeddingGateway).
    async fn create_embedding(&self, model: &str, input: &str) -> MemoryResult<Vec<f32>>;
}
