//! Memory Domain Library
//!
//! This module provides the semantic ingestion-and-retrieval core of the
//! Hivemind gateway: free text is converted into a fixed-dimensional
//! embedding by an external provider, persisted with its source text in a
//! vector index, and retrieved by nearest-neighbor search over an embedded
//! query.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌───────────────┐
//! │ IngestionService │   │ SearchService │   ← embed + persist / embed + query
//! └────────┬─────────┘   └──────┬────────┘
//!          │     ┌──────────────┤
//!          │     │    ┌─────────▼─────────┐
//!          │     │    │ CollectionManager │   ← readiness gate, schema check
//!          │     │    └─────────┬─────────┘
//! ┌────────▼─────▼──┐  ┌────────▼────────┐
//! │ EmbeddingGateway│  │   VectorIndex   │
//! │                 │  │     (trait)     │
//! └────────┬────────┘  └────────┬────────┘
//! ┌────────▼────────┐  ┌────────▼────────┐
//! │EmbeddingProvider│  │   QdrantIndex   │
//! │ (trait, OpenAI) │  │ (implementation)│
//! └─────────────────┘  └─────────────────┘
//! ```
//!
//! All clients are explicitly constructed and dependency-injected; the
//! lifecycle is construct → `ensure_ready` → serve. The collection manager
//! publishes readiness through an atomic flag, and no ingestion or search
//! traffic is served before it verifies the collection's dimensionality.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_memory::{
//!     CollectionConfig, CollectionManager, EmbeddingGateway, IngestionService,
//!     OpenAIProvider, QdrantConfig, QdrantIndex, SearchService,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let index = Arc::new(QdrantIndex::new(QdrantConfig::from_env()?).await?);
//! let provider = Arc::new(OpenAIProvider::from_env()?);
//! let embedder = Arc::new(EmbeddingGateway::new(provider, "text-embedding-3-small", 1536));
//!
//! let config = CollectionConfig::new("Hivemind", 1536);
//! let manager = Arc::new(CollectionManager::new(Arc::clone(&index), config));
//! manager.ensure_ready().await?;
//!
//! let ingestion = IngestionService::new(Arc::clone(&index), Arc::clone(&manager), Arc::clone(&embedder));
//! let search = SearchService::new(index, manager, embedder);
//!
//! let id = ingestion.ingest("the sky is blue").await?;
//! let hits = search.search("sky color", 5).await?;
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod models;
pub mod qdrant;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use collection::CollectionManager;
pub use embedding::{EmbeddingGateway, EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{MemoryError, MemoryResult};
pub use handlers::{GatewayApiDoc, GatewayState};
pub use models::{
    CollectionConfig, CollectionInfo, DistanceMetric, Document, ScoredPoint, SearchHit,
    SearchQuery,
};
pub use qdrant::{QdrantConfig, QdrantIndex};
pub use repository::VectorIndex;
pub use service::{DEFAULT_SEARCH_LIMIT, IngestionService, SearchService};
