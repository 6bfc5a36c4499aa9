//! Hivemind Gateway
//!
//! A semantic ingestion-and-retrieval service: free text is embedded via the
//! OpenAI embeddings API, persisted in a Qdrant collection, and retrieved by
//! nearest-neighbor search over an embedded query.
//!
//! ## Architecture
//!
//! ```text
//! Client (HTTP/JSON)
//!   ↓
//! axum handlers (domain_memory::handlers)
//!   ↓
//! IngestionService / SearchService
//!   ↓ (gated by CollectionManager readiness)
//! ┌─────────────────┬──────────────────┐
//! │   QdrantIndex   │ EmbeddingGateway │
//! └─────────────────┴──────────────────┘
//!   ↓                  ↓
//! Qdrant            OpenAI API
//! ```
//!
//! ## Modules
//!
//! - `config`: environment-driven deployment configuration
//! - `server`: server initialization and lifecycle

pub mod config;
pub mod server;

// Re-export for convenience
pub use server::run;
