use core_config::server::ServerConfig;
use core_config::{ConfigError, Environment, FromEnv, env_or_default};
use domain_memory::{CollectionConfig, DistanceMetric};

/// Deployment configuration for the gateway, resolved from the environment.
///
/// The embedding dimensionality is a deployment parameter shared by the
/// collection configuration and the embedding gateway, so both sides of the
/// dimension contract come from a single source.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub collection: CollectionConfig,
    pub embedding_model: String,
}

impl GatewayConfig {
    /// Reads from environment variables with sensible defaults:
    /// - COLLECTION_NAME: defaults to "Hivemind"
    /// - EMBEDDING_DIMENSION: defaults to 1536 (text-embedding-3-small)
    /// - EMBEDDING_MODEL: defaults to "text-embedding-3-small"
    /// - DISTANCE_METRIC: defaults to "cosine"
    /// - HOST/PORT: see [`ServerConfig`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;

        let dimension: u64 = env_or_default("EMBEDDING_DIMENSION", "1536")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "EMBEDDING_DIMENSION".to_string(),
                details: format!("{}", e),
            })?;

        let distance: DistanceMetric = env_or_default("DISTANCE_METRIC", "cosine")
            .parse()
            .map_err(|details| ConfigError::ParseError {
                key: "DISTANCE_METRIC".to_string(),
                details,
            })?;

        let collection = CollectionConfig::new(env_or_default("COLLECTION_NAME", "Hivemind"), dimension)
            .with_distance(distance);

        let embedding_model = env_or_default("EMBEDDING_MODEL", "text-embedding-3-small");

        Ok(Self {
            environment,
            server,
            collection,
            embedding_model,
        })
    }
}
