use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::collection::CollectionManager;
use crate::embedding::EmbeddingGateway;
use crate::error::{MemoryError, MemoryResult};
use crate::models::{Document, SearchHit, SearchQuery};
use crate::repository::VectorIndex;

/// Default number of results when a search request does not specify a limit.
pub const DEFAULT_SEARCH_LIMIT: u64 = 5;

/// Turns a text document into an embedding and a persisted point.
pub struct IngestionService<R: VectorIndex> {
    index: Arc<R>,
    manager: Arc<CollectionManager<R>>,
    embedder: Arc<EmbeddingGateway>,
}

impl<R: VectorIndex> IngestionService<R> {
    pub fn new(
        index: Arc<R>,
        manager: Arc<CollectionManager<R>>,
        embedder: Arc<EmbeddingGateway>,
    ) -> Self {
        Self {
            index,
            manager,
            embedder,
        }
    }

    /// Ingest one document and return its freshly assigned id.
    ///
    /// Re-ingesting identical text produces a new document with a new id;
    /// there is no deduplication by content. The write is acknowledged by the
    /// index before this returns, so the document is immediately searchable.
    pub async fn ingest(&self, text: &str) -> MemoryResult<Uuid> {
        if text.is_empty() {
            return Err(MemoryError::InvalidInput(
                "text must not be empty".to_string(),
            ));
        }

        self.manager.require_ready()?;

        let embedding = self.embedder.embed(text).await?;
        let document = Document::new(text, embedding);
        let id = document.id;

        self.index
            .upsert(self.manager.collection(), document)
            .await?;

        debug!(%id, "document ingested");
        Ok(id)
    }
}

/// Answers nearest-neighbor queries over ingested documents.
pub struct SearchService<R: VectorIndex> {
    index: Arc<R>,
    manager: Arc<CollectionManager<R>>,
    embedder: Arc<EmbeddingGateway>,
}

impl<R: VectorIndex> SearchService<R> {
    pub fn new(
        index: Arc<R>,
        manager: Arc<CollectionManager<R>>,
        embedder: Arc<EmbeddingGateway>,
    ) -> Self {
        Self {
            index,
            manager,
            embedder,
        }
    }

    /// Return up to `limit` stored documents nearest to `text`, ordered by
    /// descending similarity score. An empty collection yields an empty
    /// sequence, not an error.
    pub async fn search(&self, text: &str, limit: u64) -> MemoryResult<Vec<SearchHit>> {
        if text.is_empty() {
            return Err(MemoryError::InvalidInput(
                "text must not be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Err(MemoryError::InvalidInput(
                "limit must be positive".to_string(),
            ));
        }

        self.manager.require_ready()?;

        let vector = self.embedder.embed(text).await?;
        let points = self
            .index
            .search(self.manager.collection(), SearchQuery::new(vector, limit))
            .await?;

        // A hit without a text payload should not occur (ingestion always
        // writes one); omit it rather than coerce it to an empty string.
        Ok(points
            .into_iter()
            .filter_map(|point| match point.text() {
                Some(text) => Some(SearchHit {
                    score: point.score,
                    text,
                }),
                None => {
                    warn!(id = %point.id, "search hit without text payload, omitting");
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::models::{CollectionConfig, CollectionInfo, DistanceMetric, ScoredPoint};
    use crate::repository::MockVectorIndex;
    use serde_json::json;

    const DIMENSION: usize = 4;

    fn expect_readiness(index: &mut MockVectorIndex) {
        index.expect_get_collection().returning(|_| {
            Ok(Some(CollectionInfo {
                name: "Hivemind".to_string(),
                dimension: DIMENSION as u64,
                distance: DistanceMetric::Cosine,
                points_count: 0,
            }))
        });
        index
            .expect_create_payload_index()
            .returning(|_, _| Ok(()));
    }

    fn embedder_returning(vector: Vec<f32>) -> Arc<EmbeddingGateway> {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_create_embedding()
            .returning(move |_, _| Ok(vector.clone()));
        Arc::new(EmbeddingGateway::new(
            Arc::new(provider),
            "text-embedding-3-small",
            DIMENSION,
        ))
    }

    fn silent_embedder() -> Arc<EmbeddingGateway> {
        // No expectations: any provider call panics the test.
        Arc::new(EmbeddingGateway::new(
            Arc::new(MockEmbeddingProvider::new()),
            "text-embedding-3-small",
            DIMENSION,
        ))
    }

    async fn ready_manager(index: Arc<MockVectorIndex>) -> Arc<CollectionManager<MockVectorIndex>> {
        let manager = Arc::new(CollectionManager::new(
            index,
            CollectionConfig::new("Hivemind", DIMENSION as u64),
        ));
        manager.ensure_ready().await.unwrap();
        manager
    }

    #[tokio::test]
    async fn test_ingest_assigns_fresh_ids_for_identical_text() {
        let mut index = MockVectorIndex::new();
        expect_readiness(&mut index);
        index.expect_upsert().times(2).returning(|_, _| Ok(()));

        let index = Arc::new(index);
        let manager = ready_manager(Arc::clone(&index)).await;
        let service = IngestionService::new(index, manager, embedder_returning(vec![0.1; DIMENSION]));

        let first = service.ingest("the sky is blue").await.unwrap();
        let second = service.ingest("the sky is blue").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_ingest_rejects_empty_text_before_any_external_call() {
        // Neither the index nor the provider has expectations: any call panics.
        let index = Arc::new(MockVectorIndex::new());
        let manager = Arc::new(CollectionManager::new(
            Arc::clone(&index),
            CollectionConfig::new("Hivemind", DIMENSION as u64),
        ));
        let service = IngestionService::new(index, manager, silent_embedder());

        let err = service.ingest("").await.unwrap_err();
        assert!(matches!(err, MemoryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_ingest_before_readiness_fails_with_not_ready() {
        let index = Arc::new(MockVectorIndex::new());
        let manager = Arc::new(CollectionManager::new(
            Arc::clone(&index),
            CollectionConfig::new("Hivemind", DIMENSION as u64),
        ));
        let service = IngestionService::new(index, manager, silent_embedder());

        let err = service.ingest("the sky is blue").await.unwrap_err();
        assert!(matches!(err, MemoryError::NotReady));
    }

    #[tokio::test]
    async fn test_ingest_never_forwards_a_malformed_vector() {
        let mut index = MockVectorIndex::new();
        expect_readiness(&mut index);
        // No upsert expectation: forwarding the wrong-length vector panics.

        let index = Arc::new(index);
        let manager = ready_manager(Arc::clone(&index)).await;
        // Provider dimensionality disagrees with the collection's.
        let service = IngestionService::new(index, manager, embedder_returning(vec![0.1, 0.2]));

        let err = service.ingest("the sky is blue").await.unwrap_err();
        assert!(matches!(err, MemoryError::ConfigMismatch(_)));
    }

    #[tokio::test]
    async fn test_ingest_propagates_persist_failure() {
        let mut index = MockVectorIndex::new();
        expect_readiness(&mut index);
        index
            .expect_upsert()
            .returning(|_, _| Err(MemoryError::Persist("write rejected".to_string())));

        let index = Arc::new(index);
        let manager = ready_manager(Arc::clone(&index)).await;
        let service = IngestionService::new(index, manager, embedder_returning(vec![0.1; DIMENSION]));

        let err = service.ingest("the sky is blue").await.unwrap_err();
        assert!(matches!(err, MemoryError::Persist(_)));
    }

    #[tokio::test]
    async fn test_search_maps_hits_in_score_order() {
        let mut index = MockVectorIndex::new();
        expect_readiness(&mut index);
        index
            .expect_search()
            .withf(|collection, query| collection == "Hivemind" && query.limit == 2)
            .returning(|_, _| {
                Ok(vec![
                    ScoredPoint {
                        id: Uuid::new_v4(),
                        score: 0.92,
                        payload: Some(json!({ "text": "the sky is blue" })),
                    },
                    ScoredPoint {
                        id: Uuid::new_v4(),
                        score: 0.41,
                        payload: Some(json!({ "text": "grass is green" })),
                    },
                ])
            });

        let index = Arc::new(index);
        let manager = ready_manager(Arc::clone(&index)).await;
        let service = SearchService::new(index, manager, embedder_returning(vec![0.1; DIMENSION]));

        let hits = service.search("sky color", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "the sky is blue");
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_search_omits_hits_without_text_payload() {
        let mut index = MockVectorIndex::new();
        expect_readiness(&mut index);
        index.expect_search().returning(|_, _| {
            Ok(vec![
                ScoredPoint {
                    id: Uuid::new_v4(),
                    score: 0.9,
                    payload: Some(json!({ "text": "intact" })),
                },
                ScoredPoint {
                    id: Uuid::new_v4(),
                    score: 0.8,
                    payload: Some(json!({ "created_at": "2026-08-08T00:00:00+00:00" })),
                },
                ScoredPoint {
                    id: Uuid::new_v4(),
                    score: 0.7,
                    payload: None,
                },
            ])
        });

        let index = Arc::new(index);
        let manager = ready_manager(Arc::clone(&index)).await;
        let service = SearchService::new(index, manager, embedder_returning(vec![0.1; DIMENSION]));

        let hits = service.search("anything", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "intact");
    }

    #[tokio::test]
    async fn test_search_on_empty_collection_returns_empty_sequence() {
        let mut index = MockVectorIndex::new();
        expect_readiness(&mut index);
        index.expect_search().returning(|_, _| Ok(vec![]));

        let index = Arc::new(index);
        let manager = ready_manager(Arc::clone(&index)).await;
        let service = SearchService::new(index, manager, embedder_returning(vec![0.1; DIMENSION]));

        let hits = service.search("anything", 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_empty_text_and_zero_limit() {
        let index = Arc::new(MockVectorIndex::new());
        let manager = Arc::new(CollectionManager::new(
            Arc::clone(&index),
            CollectionConfig::new("Hivemind", DIMENSION as u64),
        ));
        let service = SearchService::new(index, manager, silent_embedder());

        assert!(matches!(
            service.search("", 5).await.unwrap_err(),
            MemoryError::InvalidInput(_)
        ));
        assert!(matches!(
            service.search("sky", 0).await.unwrap_err(),
            MemoryError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn test_search_propagates_query_failure() {
        let mut index = MockVectorIndex::new();
        expect_readiness(&mut index);
        index
            .expect_search()
            .returning(|_, _| Err(MemoryError::Query("connection reset".to_string())));

        let index = Arc::new(index);
        let manager = ready_manager(Arc::clone(&index)).await;
        let service = SearchService::new(index, manager, embedder_returning(vec![0.1; DIMENSION]));

        let err = service.search("anything", 5).await.unwrap_err();
        assert!(matches!(err, MemoryError::Query(_)));
    }
}
