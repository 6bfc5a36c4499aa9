use std::sync::Arc;

use super::EmbeddingProvider;
use crate::error::{MemoryError, MemoryResult};

/// Wraps an [`EmbeddingProvider`] and enforces the gateway's postconditions:
/// the provider must return a vector, and its length must equal the
/// collection's configured dimensionality.
///
/// A wrong-length vector means the model and the collection were provisioned
/// with different dimensionalities; that is surfaced as a configuration
/// error, distinct from a transient provider failure, and is never forwarded
/// to the index.
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    dimension: usize,
}

impl EmbeddingGateway {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            dimension,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed `text`. The returned vector always has exactly `dimension`
    /// entries. One provider round trip per call; no caching, no retries.
    pub async fn embed(&self, text: &str) -> MemoryResult<Vec<f32>> {
        if text.is_empty() {
            return Err(MemoryError::InvalidInput(
                "text must not be empty".to_string(),
            ));
        }

        let vector = self.provider.create_embedding(&self.model, text).await?;

        if vector.is_empty() {
            return Err(MemoryError::Embedding(
                "provider returned an empty embedding".to_string(),
            ));
        }

        if vector.len() != self.dimension {
            return Err(MemoryError::ConfigMismatch(format!(
                "model '{}' produced a {}-dimensional vector, collection expects {}",
                self.model,
                vector.len(),
                self.dimension
            )));
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;

    fn gateway_with(provider: MockEmbeddingProvider, dimension: usize) -> EmbeddingGateway {
        EmbeddingGateway::new(Arc::new(provider), "text-embedding-3-small", dimension)
    }

    #[tokio::test]
    async fn test_embed_passes_model_and_text_through() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_create_embedding()
            .withf(|model, input| model == "text-embedding-3-small" && input == "hello")
            .returning(|_, _| Ok(vec![0.1, 0.2, 0.3]));

        let gateway = gateway_with(provider, 3);
        let vector = gateway.embed("hello").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_rejects_empty_text_before_calling_provider() {
        // No expectations set: a provider call would panic.
        let gateway = gateway_with(MockEmbeddingProvider::new(), 3);
        let err = gateway.embed("").await.unwrap_err();
        assert!(matches!(err, MemoryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_embed_flags_empty_result_as_embedding_failure() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_create_embedding()
            .returning(|_, _| Ok(vec![]));

        let gateway = gateway_with(provider, 3);
        let err = gateway.embed("hello").await.unwrap_err();
        assert!(matches!(err, MemoryError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_embed_flags_wrong_dimension_as_config_mismatch() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_create_embedding()
            .returning(|_, _| Ok(vec![0.1, 0.2]));

        let gateway = gateway_with(provider, 1536);
        let err = gateway.embed("hello").await.unwrap_err();
        assert!(matches!(err, MemoryError::ConfigMismatch(_)));
    }

    #[tokio::test]
    async fn test_embed_propagates_provider_unavailability() {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_create_embedding().returning(|_, _| {
            Err(MemoryError::ProviderUnavailable("rate limited".to_string()))
        });

        let gateway = gateway_with(provider, 3);
        let err = gateway.embed("hello").await.unwrap_err();
        assert!(matches!(err, MemoryError::ProviderUnavailable(_)));
    }
}
