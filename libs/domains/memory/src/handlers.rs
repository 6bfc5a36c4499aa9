//! HTTP entry points for document ingestion and similarity search.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::collection::CollectionManager;
use crate::error::{MemoryError, MemoryResult};
use crate::models::SearchHit;
use crate::repository::VectorIndex;
use crate::service::{DEFAULT_SEARCH_LIMIT, IngestionService, SearchService};

/// Shared handler state, assembled at startup with explicitly constructed,
/// dependency-injected services.
pub struct GatewayState<R: VectorIndex> {
    pub ingestion: Arc<IngestionService<R>>,
    pub search: Arc<SearchService<R>>,
    pub manager: Arc<CollectionManager<R>>,
}

impl<R: VectorIndex> Clone for GatewayState<R> {
    fn clone(&self) -> Self {
        Self {
            ingestion: Arc::clone(&self.ingestion),
            search: Arc::clone(&self.search),
            manager: Arc::clone(&self.manager),
        }
    }
}

// ===== Request/Response DTOs =====

/// Request to add a document
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddDocumentRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
}

/// Response for a successfully ingested document
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddDocumentResponse {
    pub success: bool,
    pub id: Uuid,
}

/// Request to search documents
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SearchRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_SEARCH_LIMIT
}

/// Readiness state of the gateway
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
    pub ready: bool,
    pub collection: String,
}

// ===== Handlers =====

/// Add a document
#[utoipa::path(
    post,
    path = "/documents",
    tag = "memory",
    request_body = AddDocumentRequest,
    responses(
        (status = 201, description = "Document ingested", body = AddDocumentResponse),
        (status = 400, description = "Invalid request"),
        (status = 503, description = "Gateway not ready"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn add_document<R: VectorIndex>(
    State(state): State<GatewayState<R>>,
    Json(request): Json<AddDocumentRequest>,
) -> MemoryResult<impl IntoResponse> {
    request
        .validate()
        .map_err(|e| MemoryError::InvalidInput(e.to_string()))?;

    let id = state.ingestion.ingest(&request.text).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddDocumentResponse { success: true, id }),
    ))
}

/// Search documents
#[utoipa::path(
    post,
    path = "/search",
    tag = "memory",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search results, best match first", body = Vec<SearchHit>),
        (status = 400, description = "Invalid request"),
        (status = 503, description = "Gateway not ready"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn search_documents<R: VectorIndex>(
    State(state): State<GatewayState<R>>,
    Json(request): Json<SearchRequest>,
) -> MemoryResult<Json<Vec<SearchHit>>> {
    request
        .validate()
        .map_err(|e| MemoryError::InvalidInput(e.to_string()))?;

    let hits = state.search.search(&request.text, request.limit).await?;
    Ok(Json(hits))
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/ready",
    tag = "memory",
    responses(
        (status = 200, description = "Collection initialized and verified", body = ReadyResponse),
        (status = 503, description = "Gateway not ready", body = ReadyResponse)
    )
)]
pub async fn ready<R: VectorIndex>(
    State(state): State<GatewayState<R>>,
) -> impl IntoResponse {
    let ready = state.manager.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyResponse {
            ready,
            collection: state.manager.collection().to_string(),
        }),
    )
}

/// OpenAPI documentation for the gateway API
#[derive(OpenApi)]
#[openapi(
    paths(add_document, search_documents, ready),
    components(schemas(
        AddDocumentRequest,
        AddDocumentResponse,
        SearchRequest,
        SearchHit,
        ReadyResponse
    )),
    tags(
        (name = "memory", description = "Semantic document ingestion and retrieval")
    )
)]
pub struct GatewayApiDoc;

/// Create the gateway router with state applied.
pub fn router<R: VectorIndex + 'static>(state: GatewayState<R>) -> Router {
    Router::new()
        .route("/documents", post(add_document))
        .route("/search", post(search_documents))
        .route("/ready", get(ready))
        .with_state(state)
}
