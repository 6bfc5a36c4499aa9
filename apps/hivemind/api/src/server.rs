//! Server initialization and lifecycle management
//!
//! This module handles all server setup:
//! - Tracing initialization
//! - Qdrant and OpenAI client construction (dependency-injected)
//! - Blocking collection readiness gate
//! - Router assembly and HTTP server startup with graceful shutdown

use std::sync::Arc;

use axum_helpers::server::{create_app, create_router, health_router};
use core_config::app_info;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_memory::{
    CollectionManager, EmbeddingGateway, GatewayApiDoc, GatewayState, IngestionService,
    OpenAIProvider, QdrantConfig, QdrantIndex, SearchService, handlers,
};
use eyre::{Result, WrapErr};
use tracing::info;

use crate::config::GatewayConfig;

/// Run the gateway.
///
/// This is the main entry point for server initialization. It:
/// 1. Sets up structured logging (env-aware: JSON for prod, pretty for dev)
/// 2. Loads deployment configuration from the environment
/// 3. Constructs the Qdrant index and OpenAI embedding clients explicitly,
///    passing them into the services (no process-wide singletons)
/// 4. Blocks on the collection readiness gate: no ingestion or search
///    traffic is accepted until the collection exists and its configured
///    dimensionality is verified
/// 5. Starts the HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid or incomplete
/// - Qdrant is unreachable, or the stored collection's dimensionality
///   disagrees with the configured embedding model
/// - Server binding fails
pub async fn run() -> Result<()> {
    install_color_eyre();

    let config = GatewayConfig::from_env().wrap_err("Failed to load gateway configuration")?;
    init_tracing(&config.environment);

    // Connect to Qdrant
    let qdrant_config = QdrantConfig::from_env()?;
    info!("Connecting to Qdrant at {}...", qdrant_config.url);
    let index = Arc::new(
        QdrantIndex::new(qdrant_config)
            .await
            .wrap_err("Failed to connect to Qdrant")?,
    );

    // Configure the embedding provider; the gateway enforces that the model's
    // output width matches the collection's dimensionality.
    let provider =
        Arc::new(OpenAIProvider::from_env().wrap_err("Failed to configure embedding provider")?);
    let embedder = Arc::new(EmbeddingGateway::new(
        provider,
        config.embedding_model.clone(),
        config.collection.dimension as usize,
    ));

    // Readiness gate: refuse to serve until the collection is verified.
    let manager = Arc::new(CollectionManager::new(
        Arc::clone(&index),
        config.collection.clone(),
    ));
    manager
        .ensure_ready()
        .await
        .wrap_err("Vector collection initialization failed")?;

    let state = GatewayState {
        ingestion: Arc::new(IngestionService::new(
            Arc::clone(&index),
            Arc::clone(&manager),
            Arc::clone(&embedder),
        )),
        search: Arc::new(SearchService::new(
            Arc::clone(&index),
            Arc::clone(&manager),
            embedder,
        )),
        manager,
    };

    let router =
        create_router::<GatewayApiDoc>(handlers::router(state)).merge(health_router(app_info!()));

    info!(
        "Gateway serving collection '{}' with model '{}'",
        config.collection.name, config.embedding_model
    );

    create_app(router, &config.server)
        .await
        .wrap_err("Server failed")?;

    Ok(())
}
