use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

/// Payload field holding the original source text of a document.
pub const TEXT_FIELD: &str = "text";

/// Payload field holding the ingestion timestamp.
pub const CREATED_AT_FIELD: &str = "created_at";

/// Distance metric for similarity calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Dot,
    Euclidean,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Dot => "dot",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "dot" => Ok(DistanceMetric::Dot),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            other => Err(format!(
                "unknown distance metric '{other}', expected cosine, dot or euclidean"
            )),
        }
    }
}

/// Target collection configuration, fixed at deployment time.
///
/// Every stored vector and every query vector must match `dimension`
/// exactly; a dimensionality change requires a new collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionConfig {
    pub name: String,
    pub dimension: u64,
    pub distance: DistanceMetric,
    /// Payload fields to index for keyword filtering.
    pub indexed_fields: Vec<String>,
}

impl CollectionConfig {
    pub fn new(name: impl Into<String>, dimension: u64) -> Self {
        Self {
            name: name.into(),
            dimension,
            distance: DistanceMetric::default(),
            indexed_fields: vec![TEXT_FIELD.to_string()],
        }
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }
}

/// Collection state as reported by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionInfo {
    pub name: String,
    pub dimension: u64,
    pub distance: DistanceMetric,
    pub points_count: u64,
}

/// One ingested unit: the source text, its embedding, and ingestion metadata.
///
/// Documents are immutable once written; re-ingesting identical text yields a
/// new document with a fresh id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Document {
    pub id: Uuid,
    pub text: String,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Build a document with a freshly assigned random id and the current
    /// timestamp. Ids are never derived from the clock, so concurrent ingests
    /// of the same text cannot collide.
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            embedding,
            created_at: Utc::now(),
        }
    }

    /// Payload stored alongside the vector.
    pub fn payload(&self) -> serde_json::Value {
        json!({
            TEXT_FIELD: self.text,
            CREATED_AT_FIELD: self.created_at.to_rfc3339(),
        })
    }
}

/// Nearest-neighbor query parameters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    pub limit: u64,
}

impl SearchQuery {
    pub fn new(vector: Vec<f32>, limit: u64) -> Self {
        Self { vector, limit }
    }
}

/// Raw search hit as returned by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoredPoint {
    pub id: Uuid,
    pub score: f32,
    pub payload: Option<serde_json::Value>,
}

impl ScoredPoint {
    /// Extract the stored source text, if the payload carries one.
    pub fn text(&self) -> Option<String> {
        self.payload
            .as_ref()
            .and_then(|p| p.get(TEXT_FIELD))
            .and_then(|v| v.as_str())
            .map(str::to_owned)
    }
}

/// Search result returned to callers: similarity score plus the matched text.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    pub score: f32,
    pub text: String,
}
