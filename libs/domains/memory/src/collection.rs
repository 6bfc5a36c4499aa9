use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::error::{MemoryError, MemoryResult};
use crate::models::{CollectionConfig, CollectionInfo};
use crate::repository::VectorIndex;

/// Ensures the target collection exists with the declared configuration
/// before any read or write proceeds.
///
/// Readiness is published through an atomic flag: concurrent requests observe
/// either "ready" or "not ready", never a half-initialized state. No lock is
/// held across the index calls.
pub struct CollectionManager<R: VectorIndex> {
    index: Arc<R>,
    config: CollectionConfig,
    ready: AtomicBool,
}

impl<R: VectorIndex> CollectionManager<R> {
    pub fn new(index: Arc<R>, config: CollectionConfig) -> Self {
        Self {
            index,
            config,
            ready: AtomicBool::new(false),
        }
    }

    /// Name of the managed collection.
    pub fn collection(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Gate for request handling: traffic arriving before initialization
    /// completes is rejected, not served against an unverified collection.
    pub fn require_ready(&self) -> MemoryResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(MemoryError::NotReady)
        }
    }

    /// Check that the collection exists with the expected configuration,
    /// creating it (plus its payload indexes) if missing.
    ///
    /// Idempotent: safe to call repeatedly and from concurrently starting
    /// instances. Collection creation is not naturally exclusive across
    /// instances, so a failed create is re-checked as a describe; if a
    /// concurrent startup won the race, creation counts as success.
    pub async fn ensure_ready(&self) -> MemoryResult<()> {
        if self.is_ready() {
            return Ok(());
        }

        let info = match self.index.get_collection(&self.config.name).await? {
            Some(info) => info,
            None => self.create_collection().await?,
        };

        self.verify(&info)?;

        for field in &self.config.indexed_fields {
            self.index
                .create_payload_index(&self.config.name, field)
                .await?;
        }

        self.ready.store(true, Ordering::Release);
        info!(
            collection = %self.config.name,
            dimension = self.config.dimension,
            distance = self.config.distance.as_str(),
            "collection ready"
        );

        Ok(())
    }

    async fn create_collection(&self) -> MemoryResult<CollectionInfo> {
        match self.index.create_collection(&self.config).await {
            Ok(()) => Ok(CollectionInfo {
                name: self.config.name.clone(),
                dimension: self.config.dimension,
                distance: self.config.distance,
                points_count: 0,
            }),
            Err(create_err) => match self.index.get_collection(&self.config.name).await {
                Ok(Some(info)) => {
                    debug!(
                        collection = %self.config.name,
                        "collection was created concurrently, treating as success"
                    );
                    Ok(info)
                }
                _ => Err(create_err),
            },
        }
    }

    fn verify(&self, info: &CollectionInfo) -> MemoryResult<()> {
        if info.dimension != self.config.dimension {
            return Err(MemoryError::ConfigMismatch(format!(
                "collection '{}' has dimension {}, configuration expects {}",
                self.config.name, info.dimension, self.config.dimension
            )));
        }

        if info.distance != self.config.distance {
            return Err(MemoryError::ConfigMismatch(format!(
                "collection '{}' uses {} distance, configuration expects {}",
                self.config.name,
                info.distance.as_str(),
                self.config.distance.as_str()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DistanceMetric;
    use crate::repository::MockVectorIndex;
    use mockall::Sequence;

    fn config() -> CollectionConfig {
        CollectionConfig::new("Hivemind", 1536)
    }

    fn matching_info() -> CollectionInfo {
        CollectionInfo {
            name: "Hivemind".to_string(),
            dimension: 1536,
            distance: DistanceMetric::Cosine,
            points_count: 0,
        }
    }

    #[tokio::test]
    async fn test_creates_missing_collection_and_payload_index() {
        let mut index = MockVectorIndex::new();
        index
            .expect_get_collection()
            .times(1)
            .returning(|_| Ok(None));
        index
            .expect_create_collection()
            .withf(|config| config.name == "Hivemind" && config.dimension == 1536)
            .times(1)
            .returning(|_| Ok(()));
        index
            .expect_create_payload_index()
            .withf(|collection, field| collection == "Hivemind" && field == "text")
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = CollectionManager::new(Arc::new(index), config());
        assert!(!manager.is_ready());
        manager.ensure_ready().await.unwrap();
        assert!(manager.is_ready());
    }

    #[tokio::test]
    async fn test_existing_collection_is_verified_not_recreated() {
        let mut index = MockVectorIndex::new();
        index
            .expect_get_collection()
            .times(1)
            .returning(|_| Ok(Some(matching_info())));
        index
            .expect_create_payload_index()
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = CollectionManager::new(Arc::new(index), config());
        manager.ensure_ready().await.unwrap();
        assert!(manager.is_ready());
    }

    #[tokio::test]
    async fn test_tolerates_losing_the_creation_race() {
        let mut index = MockVectorIndex::new();
        let mut seq = Sequence::new();

        // Collection missing on first look...
        index
            .expect_get_collection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        // ...another instance creates it first...
        index
            .expect_create_collection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(MemoryError::Persist("collection already exists".to_string())));
        // ...so the follow-up describe finds it.
        index
            .expect_get_collection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(matching_info())));
        index
            .expect_create_payload_index()
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = CollectionManager::new(Arc::new(index), config());
        manager.ensure_ready().await.unwrap();
        assert!(manager.is_ready());
    }

    #[tokio::test]
    async fn test_create_failure_without_concurrent_winner_propagates() {
        let mut index = MockVectorIndex::new();
        let mut seq = Sequence::new();

        index
            .expect_get_collection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        index
            .expect_create_collection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(MemoryError::Persist("quota exceeded".to_string())));
        index
            .expect_get_collection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        let manager = CollectionManager::new(Arc::new(index), config());
        let err = manager.ensure_ready().await.unwrap_err();
        assert!(matches!(err, MemoryError::Persist(_)));
        assert!(!manager.is_ready());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_fatal() {
        let mut index = MockVectorIndex::new();
        index.expect_get_collection().times(1).returning(|_| {
            Ok(Some(CollectionInfo {
                name: "Hivemind".to_string(),
                dimension: 384,
                distance: DistanceMetric::Cosine,
                points_count: 42,
            }))
        });

        let manager = CollectionManager::new(Arc::new(index), config());
        let err = manager.ensure_ready().await.unwrap_err();
        assert!(matches!(err, MemoryError::ConfigMismatch(_)));
        assert!(!manager.is_ready());
        assert!(manager.require_ready().is_err());
    }

    #[tokio::test]
    async fn test_distance_mismatch_is_fatal() {
        let mut index = MockVectorIndex::new();
        index.expect_get_collection().times(1).returning(|_| {
            Ok(Some(CollectionInfo {
                name: "Hivemind".to_string(),
                dimension: 1536,
                distance: DistanceMetric::Euclidean,
                points_count: 0,
            }))
        });

        let manager = CollectionManager::new(Arc::new(index), config());
        let err = manager.ensure_ready().await.unwrap_err();
        assert!(matches!(err, MemoryError::ConfigMismatch(_)));
    }

    #[tokio::test]
    async fn test_second_call_short_circuits() {
        let mut index = MockVectorIndex::new();
        // times(1): a second pass over the index would fail the test.
        index
            .expect_get_collection()
            .times(1)
            .returning(|_| Ok(Some(matching_info())));
        index
            .expect_create_payload_index()
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = CollectionManager::new(Arc::new(index), config());
        manager.ensure_ready().await.unwrap();
        manager.ensure_ready().await.unwrap();
    }

    #[tokio::test]
    async fn test_require_ready_before_initialization() {
        let index = MockVectorIndex::new();
        let manager = CollectionManager::new(Arc::new(index), config());
        assert!(matches!(
            manager.require_ready().unwrap_err(),
            MemoryError::NotReady
        ));
    }
}
