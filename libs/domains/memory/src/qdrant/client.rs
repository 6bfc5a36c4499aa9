use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType,
    PointId, PointStruct, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use uuid::Uuid;

use super::QdrantConfig;
use crate::error::{MemoryError, MemoryResult};
use crate::models::{
    CollectionConfig, CollectionInfo, DistanceMetric, Document, ScoredPoint, SearchQuery,
};
use crate::repository::VectorIndex;

/// Qdrant-backed implementation of [`VectorIndex`]
pub struct QdrantIndex {
    client: Qdrant,
}

impl QdrantIndex {
    pub async fn new(config: QdrantConfig) -> MemoryResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| MemoryError::Internal(format!("failed to build qdrant client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Dot => Distance::Dot,
            DistanceMetric::Euclidean => Distance::Euclid,
        }
    }

    fn from_qdrant_distance(distance: Distance) -> DistanceMetric {
        match distance {
            Distance::Cosine => DistanceMetric::Cosine,
            Distance::Dot => DistanceMetric::Dot,
            Distance::Euclid => DistanceMetric::Euclidean,
            _ => DistanceMetric::Cosine,
        }
    }

    fn uuid_to_point_id(id: Uuid) -> PointId {
        PointId::from(id.to_string())
    }

    fn point_id_to_uuid(point_id: &PointId) -> MemoryResult<Uuid> {
        match &point_id.point_id_options {
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid_str)) => Uuid::parse_str(uuid_str)
                .map_err(|e| MemoryError::Internal(format!("invalid point uuid: {}", e))),
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(Uuid::from_u128(*num as u128)),
            None => Err(MemoryError::Internal("missing point id".to_string())),
        }
    }

    fn payload_to_qdrant(payload: serde_json::Value) -> HashMap<String, QdrantValue> {
        let mut result = HashMap::new();

        if let serde_json::Value::Object(map) = payload {
            for (key, val) in map {
                if let Some(qdrant_val) = json_to_qdrant_value(val) {
                    result.insert(key, qdrant_val);
                }
            }
        }

        result
    }

    fn qdrant_to_payload(payload: HashMap<String, QdrantValue>) -> Option<serde_json::Value> {
        if payload.is_empty() {
            return None;
        }

        let mut map = serde_json::Map::new();
        for (key, val) in payload {
            if let Some(json_val) = qdrant_value_to_json(val) {
                map.insert(key, json_val);
            }
        }

        Some(serde_json::Value::Object(map))
    }

    fn extract_vector_params(config: &Option<qdrant::CollectionConfig>) -> (u64, DistanceMetric) {
        let vectors = config
            .as_ref()
            .and_then(|c| c.params.as_ref())
            .and_then(|p| p.vectors_config.as_ref())
            .and_then(|vc| vc.config.as_ref());

        match vectors {
            Some(qdrant::vectors_config::Config::Params(p)) => {
                (p.size, Self::from_qdrant_distance(p.distance()))
            }
            Some(qdrant::vectors_config::Config::ParamsMap(map)) => map
                .map
                .values()
                .next()
                .map(|p| (p.size, Self::from_qdrant_distance(p.distance())))
                .unwrap_or((0, DistanceMetric::Cosine)),
            None => (0, DistanceMetric::Cosine),
        }
    }
}

fn json_to_qdrant_value(val: serde_json::Value) -> Option<QdrantValue> {
    match val {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(QdrantValue::from(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(QdrantValue::from(i))
            } else {
                n.as_f64().map(QdrantValue::from)
            }
        }
        serde_json::Value::String(s) => Some(QdrantValue::from(s)),
        // Complex types are serialized to a string
        _ => Some(QdrantValue::from(val.to_string())),
    }
}

fn qdrant_value_to_json(val: QdrantValue) -> Option<serde_json::Value> {
    use qdrant::value::Kind;

    match val.kind {
        Some(Kind::NullValue(_)) => Some(serde_json::Value::Null),
        Some(Kind::BoolValue(b)) => Some(serde_json::Value::Bool(b)),
        Some(Kind::IntegerValue(i)) => Some(serde_json::Value::Number(i.into())),
        Some(Kind::DoubleValue(f)) => {
            serde_json::Number::from_f64(f).map(serde_json::Value::Number)
        }
        Some(Kind::StringValue(s)) => Some(serde_json::Value::String(s)),
        _ => None,
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn get_collection(&self, name: &str) -> MemoryResult<Option<CollectionInfo>> {
        // Probe existence first: collection_info errors both for a missing
        // collection and an unreachable index, and those must not be conflated.
        let exists = self
            .client
            .collection_exists(name)
            .await
            .map_err(|e| MemoryError::Query(format!("describe collection '{}': {}", name, e)))?;

        if !exists {
            return Ok(None);
        }

        let response = self
            .client
            .collection_info(name)
            .await
            .map_err(|e| MemoryError::Query(format!("describe collection '{}': {}", name, e)))?;

        let result = response
            .result
            .ok_or_else(|| MemoryError::Internal("collection info missing result".to_string()))?;

        let (dimension, distance) = Self::extract_vector_params(&result.config);

        Ok(Some(CollectionInfo {
            name: name.to_string(),
            dimension,
            distance,
            points_count: result.points_count.unwrap_or(0),
        }))
    }

    async fn create_collection(&self, config: &CollectionConfig) -> MemoryResult<()> {
        let builder = CreateCollectionBuilder::new(&config.name).vectors_config(
            VectorParamsBuilder::new(config.dimension, Self::to_qdrant_distance(config.distance)),
        );

        self.client.create_collection(builder).await.map_err(|e| {
            MemoryError::Persist(format!("create collection '{}': {}", config.name, e))
        })?;

        Ok(())
    }

    async fn create_payload_index(&self, collection: &str, field: &str) -> MemoryResult<()> {
        let builder =
            CreateFieldIndexCollectionBuilder::new(collection, field, FieldType::Keyword)
                .wait(true);

        self.client.create_field_index(builder).await.map_err(|e| {
            MemoryError::Persist(format!(
                "create payload index on '{}.{}': {}",
                collection, field, e
            ))
        })?;

        Ok(())
    }

    async fn upsert(&self, collection: &str, document: Document) -> MemoryResult<()> {
        let id = document.id;
        let payload = Self::payload_to_qdrant(document.payload());
        let point = PointStruct::new(Self::uuid_to_point_id(id), document.embedding, payload);

        // wait(true): the write must be acknowledged as committed before the
        // caller is told the document exists.
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, vec![point]).wait(true))
            .await
            .map_err(|e| MemoryError::Persist(format!("upsert point {}: {}", id, e)))?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: SearchQuery,
    ) -> MemoryResult<Vec<ScoredPoint>> {
        let builder =
            SearchPointsBuilder::new(collection, query.vector, query.limit).with_payload(true);

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| MemoryError::Query(format!("search '{}': {}", collection, e)))?;

        response
            .result
            .into_iter()
            .map(|point| {
                let id = point
                    .id
                    .as_ref()
                    .map(Self::point_id_to_uuid)
                    .transpose()?
                    .ok_or_else(|| MemoryError::Internal("search hit missing point id".to_string()))?;

                Ok(ScoredPoint {
                    id,
                    score: point.score,
                    payload: Self::qdrant_to_payload(point.payload),
                })
            })
            .collect()
    }
}
