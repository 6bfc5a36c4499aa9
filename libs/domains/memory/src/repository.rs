use async_trait::async_trait;

use crate::error::MemoryResult;
use crate::models::{CollectionConfig, CollectionInfo, Document, ScoredPoint, SearchQuery};

/// Repository trait for the external vector index.
///
/// This trait abstracts the underlying vector database (Qdrant). The index is
/// the sole shared mutable resource of the gateway; implementations must be
/// safe to call from concurrent requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Describe a collection. `Ok(None)` means the collection does not exist;
    /// an unreachable index is an error, never `None`.
    async fn get_collection(&self, name: &str) -> MemoryResult<Option<CollectionInfo>>;

    /// Create a collection with the configured dimension and distance metric.
    async fn create_collection(&self, config: &CollectionConfig) -> MemoryResult<()>;

    /// Create a keyword payload index on `field`.
    async fn create_payload_index(&self, collection: &str, field: &str) -> MemoryResult<()>;

    /// Persist one document. Returns only after the index acknowledges the
    /// write as committed; the point is then immediately searchable.
    async fn upsert(&self, collection: &str, document: Document) -> MemoryResult<()>;

    /// Nearest-neighbor query with payload included, ordered by descending
    /// score. An empty collection yields an empty result, not an error.
    async fn search(
        &self,
        collection: &str,
        query: SearchQuery,
    ) -> MemoryResult<Vec<ScoredPoint>>;
}
